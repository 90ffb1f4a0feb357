use glam::{Mat4, Vec3};

use crate::foundation::core::HostMatrix;

/// Convert a host row-major matrix into a `glam` matrix.
pub(crate) fn host_to_mat4(m: &HostMatrix) -> Mat4 {
    // `from_cols_array_2d` reads each inner array as a column.
    Mat4::from_cols_array_2d(m).transpose()
}

/// Convert a `glam` matrix back into host row-major layout.
pub(crate) fn mat4_to_host(m: Mat4) -> HostMatrix {
    m.transpose().to_cols_array_2d()
}

/// Invert a host matrix. Returns `None` for singular input.
///
/// Singularity is judged by the inverse itself, so uniformly tiny but well-conditioned
/// matrices still invert.
pub(crate) fn invert_host(m: &HostMatrix) -> Option<HostMatrix> {
    let mat = host_to_mat4(m);
    if mat.determinant() == 0.0 {
        return None;
    }
    let inv = mat.inverse();
    if !inv.is_finite() {
        return None;
    }
    Some(mat4_to_host(inv))
}

/// Translation column of a host matrix.
pub(crate) fn host_translation(m: &HostMatrix) -> Vec3 {
    Vec3::new(m[0][3], m[1][3], m[2][3])
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
