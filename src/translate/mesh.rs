use glam::{Vec2, Vec3};

use crate::foundation::error::{BridgeError, BridgeResult};
use crate::host::HostMesh;

/// Primitive topology of a [`MeshData`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrawMode {
    /// Indexed triangle list.
    #[default]
    Triangles,
    /// Point cloud.
    Points,
}

/// Renderer-ready geometry.
///
/// Built once by [`translate_mesh`] and handed to the engine by value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    colors: Option<Vec<[f32; 4]>>,
    uvs: Option<Vec<[f32; 2]>>,
    tangents: Option<Vec<[f32; 4]>>,
    indices: Vec<u32>,
    draw_mode: DrawMode,
}

impl MeshData {
    /// Per-vertex positions.
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Per-vertex normals.
    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    /// Per-vertex RGBA colours, if present.
    pub fn colors(&self) -> Option<&[[f32; 4]]> {
        self.colors.as_deref()
    }

    /// Per-vertex UVs, if present.
    pub fn uvs(&self) -> Option<&[[f32; 2]]> {
        self.uvs.as_deref()
    }

    /// Per-vertex tangents with handedness in `w`; present whenever UVs are.
    pub fn tangents(&self) -> Option<&[[f32; 4]]> {
        self.tangents.as_deref()
    }

    /// Draw indices.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Primitive mode.
    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    /// Number of emitted vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

fn negate(v: [f32; 3]) -> [f32; 3] {
    [-v[0], -v[1], -v[2]]
}

fn lookup<T: Copy>(items: &[T], idx: u32, what: &str) -> BridgeResult<T> {
    items.get(idx as usize).copied().ok_or_else(|| {
        BridgeError::translation(format!(
            "{what} index {idx} out of range (len {})",
            items.len()
        ))
    })
}

fn check_len<T>(items: Option<&Vec<T>>, expected: usize, what: &str) -> BridgeResult<()> {
    match items {
        Some(v) if v.len() != expected => Err(BridgeError::translation(format!(
            "{what} has {} entries, expected {expected}",
            v.len()
        ))),
        _ => Ok(()),
    }
}

/// Convert host geometry into renderer geometry.
///
/// A mesh without triangles becomes a point cloud with one vertex per point. Otherwise every
/// triangle corner becomes its own vertex with position and normal negated on every axis;
/// colours and UVs pass through, and tangents are derived when UVs are present.
pub fn translate_mesh(mesh: &HostMesh) -> BridgeResult<MeshData> {
    if mesh.triangles.is_empty() {
        return translate_points(mesh);
    }

    check_len(mesh.corner_colors.as_ref(), mesh.corners.len(), "corner colours")?;
    check_len(mesh.corner_uvs.as_ref(), mesh.corners.len(), "corner uvs")?;

    let vertex_count = mesh.triangles.len() * 3;
    let mut out = MeshData {
        positions: Vec::with_capacity(vertex_count),
        normals: Vec::with_capacity(vertex_count),
        colors: mesh
            .corner_colors
            .as_ref()
            .map(|_| Vec::with_capacity(vertex_count)),
        uvs: mesh
            .corner_uvs
            .as_ref()
            .map(|_| Vec::with_capacity(vertex_count)),
        tangents: None,
        indices: Vec::with_capacity(vertex_count),
        draw_mode: DrawMode::Triangles,
    };

    for tri in &mesh.triangles {
        for &corner_idx in tri {
            let corner = lookup(&mesh.corners, corner_idx, "corner")?;
            let point = lookup(&mesh.points, corner.point, "point")?;

            out.indices.push(out.positions.len() as u32);
            out.positions.push(negate(point));
            out.normals.push(negate(corner.normal));
            if let (Some(dst), Some(src)) = (out.colors.as_mut(), mesh.corner_colors.as_ref()) {
                dst.push(lookup(src, corner_idx, "corner colour")?);
            }
            if let (Some(dst), Some(src)) = (out.uvs.as_mut(), mesh.corner_uvs.as_ref()) {
                dst.push(lookup(src, corner_idx, "corner uv")?);
            }
        }
    }

    if let Some(uvs) = out.uvs.as_deref() {
        out.tangents = Some(compute_tangents(&out.positions, &out.normals, uvs, &out.indices));
    }
    Ok(out)
}

fn translate_points(mesh: &HostMesh) -> BridgeResult<MeshData> {
    let normals = mesh.custom_normals.as_ref().unwrap_or(&mesh.point_normals);
    if normals.len() != mesh.points.len() {
        return Err(BridgeError::translation(format!(
            "point cloud has {} points but {} normals",
            mesh.points.len(),
            normals.len()
        )));
    }
    Ok(MeshData {
        positions: mesh.points.iter().copied().map(negate).collect(),
        normals: normals.iter().copied().map(negate).collect(),
        draw_mode: DrawMode::Points,
        ..MeshData::default()
    })
}

/// Per-vertex tangent frames from UV gradients (Lengyel).
///
/// Triangles with degenerate UVs contribute nothing; the tangent is Gram-Schmidt
/// orthogonalized against the normal and `w` carries the bitangent handedness.
fn compute_tangents(
    positions: &[[f32; 3]],
    normals: &[[f32; 3]],
    uvs: &[[f32; 2]],
    indices: &[u32],
) -> Vec<[f32; 4]> {
    let mut tan1 = vec![Vec3::ZERO; positions.len()];
    let mut tan2 = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [i1, i2, i3] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let v1 = Vec3::from(positions[i1]);
        let e1 = Vec3::from(positions[i2]) - v1;
        let e2 = Vec3::from(positions[i3]) - v1;

        let w1 = Vec2::from(uvs[i1]);
        let d1 = Vec2::from(uvs[i2]) - w1;
        let d2 = Vec2::from(uvs[i3]) - w1;

        let det = d1.x * d2.y - d2.x * d1.y;
        if det.abs() <= f32::EPSILON {
            continue;
        }
        let r = 1.0 / det;
        let sdir = (e1 * d2.y - e2 * d1.y) * r;
        let tdir = (e2 * d1.x - e1 * d2.x) * r;

        for i in [i1, i2, i3] {
            tan1[i] += sdir;
            tan2[i] += tdir;
        }
    }

    normals
        .iter()
        .zip(tan1.iter().zip(&tan2))
        .map(|(n, (t, b))| {
            let n = Vec3::from(*n);
            let tangent = (*t - n * n.dot(*t)).normalize_or_zero();
            let handedness = if n.cross(*t).dot(*b) < 0.0 { -1.0 } else { 1.0 };
            tangent.extend(handedness).to_array()
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/translate/mesh.rs"]
mod tests;
