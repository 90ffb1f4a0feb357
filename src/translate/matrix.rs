use crate::foundation::core::{EngineMatrix, HostMatrix};

/// Row order in which each host column is emitted: host rows 1 and 2 trade places.
const ROW_ORDER: [usize; 4] = [0, 2, 1, 3];

/// Emit a host matrix in the renderer's column-major layout.
///
/// Column `j` becomes `[M0j, M2j, M1j, M3j]`, then the X and Y components of the translation
/// column (indices 12 and 13) are negated. This is a fixed index remap, not a change of basis.
pub fn to_engine_matrix(m: &HostMatrix) -> EngineMatrix {
    let mut out = [0.0; 16];
    for col in 0..4 {
        for (slot, &row) in ROW_ORDER.iter().enumerate() {
            out[col * 4 + slot] = m[row][col];
        }
    }
    out[12] = -out[12];
    out[13] = -out[13];
    out
}

#[cfg(test)]
#[path = "../../tests/unit/translate/matrix.rs"]
mod tests;
