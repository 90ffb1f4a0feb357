use crate::foundation::error::{BridgeError, BridgeResult};

/// Host-native 4x4 matrix, indexed `m[row][col]` (translation lives in column 3).
pub type HostMatrix = [[f32; 4]; 4];

/// Renderer-native 4x4 matrix, 16 floats in column-major order.
pub type EngineMatrix = [f32; 16];

/// Identity in host layout.
pub const HOST_IDENTITY: HostMatrix = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Output dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Create a validated, non-empty resolution.
    pub fn new(width: u32, height: u32) -> BridgeResult<Self> {
        if width == 0 || height == 0 {
            return Err(BridgeError::validation(
                "resolution width/height must be non-zero",
            ));
        }
        Ok(Self { width, height })
    }

    /// Apply a render percentage (`100` keeps the size), never collapsing to zero.
    pub fn scaled(self, percentage: u32) -> Self {
        let scale = f64::from(percentage) / 100.0;
        Self {
            width: ((f64::from(self.width) * scale) as u32).max(1),
            height: ((f64::from(self.height) * scale) as u32).max(1),
        }
    }
}

/// Linear RGB colour.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
}

impl Rgb {
    /// Build a colour from its channels.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Shader pipeline stage.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ShaderStage {
    /// Vertex shader.
    Vertex,
    /// Fragment shader.
    Fragment,
}

impl ShaderStage {
    /// Both stages in the order they are reconciled.
    pub const ALL: [ShaderStage; 2] = [ShaderStage::Fragment, ShaderStage::Vertex];

    /// Wire name of the stage (`vert` / `frag`).
    pub fn wire_name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vert",
            ShaderStage::Fragment => "frag",
        }
    }
}

/// Context the engine is driven from.
///
/// Preview shares the host's GPU context, so already-resident textures can be referenced by
/// handle. Final renders own a dedicated engine and need pixel copies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Interactive viewport.
    #[default]
    Preview,
    /// Final/offline render.
    Final,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
