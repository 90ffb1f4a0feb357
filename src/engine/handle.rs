use std::path::Path;

use crate::foundation::core::{EngineMatrix, Rgb, ShaderStage};
use crate::foundation::error::BridgeResult;
use crate::translate::camera::CameraState;
use crate::translate::light::LightState;
use crate::translate::mesh::MeshData;

/// Result type of every fallible engine operation.
pub type EngineResult<T> = BridgeResult<T>;

/// How a texture's pixels reached the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    /// Pixels were copied from a CPU buffer.
    PixelBuffer,
    /// The engine references a GPU texture the host already owns.
    GpuHandleRef,
}

/// Where texture content comes from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextureSource<'a> {
    /// Row-major float pixels.
    Pixels(&'a [f32]),
    /// GPU texture name in the shared context.
    GpuHandle(u32),
}

impl TextureSource<'_> {
    /// Upload path this source takes.
    pub fn kind(&self) -> UploadKind {
        match self {
            TextureSource::Pixels(_) => UploadKind::PixelBuffer,
            TextureSource::GpuHandle(_) => UploadKind::GpuHandleRef,
        }
    }
}

/// A texture upload request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureUpload<'a> {
    /// Sanitized engine-side name.
    pub name: &'a str,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channels per pixel (1 to 4).
    pub channels: u32,
    /// Pixel buffer or shared GPU texture.
    pub source: TextureSource<'a>,
}

/// Capability surface of a glslViewer engine instance.
///
/// The synchronizer programs against this trait only. Implementations are either remote (a
/// [`ControlChannel`](crate::channel::process::ControlChannel) behind
/// [`RemoteEngine`](crate::engine::remote::RemoteEngine)) or in-process
/// ([`RecordingEngine`](crate::engine::recording::RecordingEngine) for tests and dry runs).
///
/// Calls are never retried by callers: an `Err` is logged and the state it would have produced
/// is simply missing until the next rebuild.
pub trait EngineHandle {
    /// Drop every loaded model.
    fn clear_models(&mut self) -> EngineResult<()>;
    /// Load (or replace) a model; the mesh is consumed.
    fn load_mesh(&mut self, name: &str, mesh: MeshData) -> EngineResult<()>;
    /// Set a model's world transform (renderer layout).
    fn set_mesh_transform_matrix(&mut self, name: &str, matrix: &EngineMatrix)
    -> EngineResult<()>;
    /// Place the sun light.
    fn set_sun(&mut self, light: &LightState) -> EngineResult<()>;
    /// Replace the camera.
    fn set_camera(&mut self, camera: &CameraState) -> EngineResult<()>;
    /// Resize the output.
    fn resize(&mut self, width: u32, height: u32) -> EngineResult<()>;
    /// Stage new source for one shader; takes effect on [`EngineHandle::load_shaders`].
    fn set_source(&mut self, stage: ShaderStage, source: &str) -> EngineResult<()>;
    /// Recompile staged shader sources.
    fn load_shaders(&mut self) -> EngineResult<()>;
    /// Set the current timeline frame.
    fn set_frame(&mut self, frame: i64) -> EngineResult<()>;
    /// Toggle FXAA.
    fn set_fxaa(&mut self, enabled: bool) -> EngineResult<()>;
    /// Enable image-based lighting from the cubemap.
    fn enable_cubemap(&mut self, enabled: bool) -> EngineResult<()>;
    /// Draw the cubemap as the background.
    fn show_cubemap(&mut self, visible: bool) -> EngineResult<()>;
    /// Overlay the loaded textures.
    fn show_textures(&mut self, visible: bool) -> EngineResult<()>;
    /// Overlay the intermediate render passes.
    fn show_passes(&mut self, visible: bool) -> EngineResult<()>;
    /// Overlay the luma histogram.
    fn show_histogram(&mut self, visible: bool) -> EngineResult<()>;
    /// Draw model bounding boxes.
    fn show_bounding_box(&mut self, visible: bool) -> EngineResult<()>;
    /// Procedural sky ground colour.
    fn set_sky_ground(&mut self, color: Rgb) -> EngineResult<()>;
    /// Procedural sky turbidity.
    fn set_sky_turbidity(&mut self, turbidity: f32) -> EngineResult<()>;
    /// `true` when a texture called `name` is already loaded.
    fn have_texture(&self, name: &str) -> bool;
    /// Upload a texture; callers check `have_texture` first.
    fn add_texture(&mut self, texture: &TextureUpload<'_>) -> EngineResult<()>;
    /// `true` when a cubemap called `name` is already loaded.
    fn have_cubemap(&self, name: &str) -> bool;
    /// Upload an equirectangular environment as the cubemap.
    fn add_cubemap(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        channels: u32,
        pixels: &[f32],
    ) -> EngineResult<()>;
    /// Set a user uniform.
    fn set_uniform(&mut self, name: &str, values: &[f32]) -> EngineResult<()>;
    /// File the next [`EngineHandle::draw`] writes to.
    fn set_output(&mut self, path: &Path) -> EngineResult<()>;
    /// Render one frame.
    fn draw(&mut self) -> EngineResult<()>;
    /// Release the engine; no further calls are expected.
    fn close(&mut self) -> EngineResult<()>;
}
