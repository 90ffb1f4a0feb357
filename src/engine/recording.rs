use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::engine::handle::{EngineHandle, EngineResult, TextureUpload, UploadKind};
use crate::foundation::core::{EngineMatrix, Rgb, ShaderStage};
use crate::foundation::error::BridgeError;
use crate::translate::camera::CameraState;
use crate::translate::light::LightState;
use crate::translate::mesh::MeshData;

/// One recorded [`EngineHandle`] call.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineCall {
    /// See [`EngineHandle::clear_models`].
    ClearModels,
    /// See [`EngineHandle::load_mesh`].
    LoadMesh {
        /// Model name.
        name: String,
        /// Consumed mesh.
        mesh: MeshData,
    },
    /// See [`EngineHandle::set_mesh_transform_matrix`].
    SetMeshTransform {
        /// Model name.
        name: String,
        /// Renderer-layout transform.
        matrix: EngineMatrix,
    },
    /// See [`EngineHandle::set_sun`].
    SetSun(LightState),
    /// See [`EngineHandle::set_camera`].
    SetCamera(CameraState),
    /// See [`EngineHandle::resize`].
    Resize {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// See [`EngineHandle::set_source`].
    SetSource {
        /// Target stage.
        stage: ShaderStage,
        /// Shader text.
        source: String,
    },
    /// See [`EngineHandle::load_shaders`].
    LoadShaders,
    /// See [`EngineHandle::set_frame`].
    SetFrame(i64),
    /// See [`EngineHandle::set_fxaa`].
    SetFxaa(bool),
    /// See [`EngineHandle::enable_cubemap`].
    EnableCubemap(bool),
    /// See [`EngineHandle::show_cubemap`].
    ShowCubemap(bool),
    /// See [`EngineHandle::show_textures`].
    ShowTextures(bool),
    /// See [`EngineHandle::show_passes`].
    ShowPasses(bool),
    /// See [`EngineHandle::show_histogram`].
    ShowHistogram(bool),
    /// See [`EngineHandle::show_bounding_box`].
    ShowBoundingBox(bool),
    /// See [`EngineHandle::set_sky_ground`].
    SetSkyGround(Rgb),
    /// See [`EngineHandle::set_sky_turbidity`].
    SetSkyTurbidity(f32),
    /// See [`EngineHandle::add_texture`]. Pixels are not kept, only how they arrived.
    AddTexture {
        /// Texture name.
        name: String,
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Channels per pixel.
        channels: u32,
        /// Upload path taken.
        upload: UploadKind,
    },
    /// See [`EngineHandle::add_cubemap`].
    AddCubemap {
        /// Cubemap name.
        name: String,
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Channels per pixel.
        channels: u32,
    },
    /// See [`EngineHandle::set_uniform`].
    SetUniform {
        /// Uniform name.
        name: String,
        /// Uniform components.
        values: Vec<f32>,
    },
    /// See [`EngineHandle::set_output`].
    SetOutput(PathBuf),
    /// See [`EngineHandle::draw`].
    Draw,
    /// See [`EngineHandle::close`].
    Close,
}

impl EngineCall {
    /// Operation name, as used by [`RecordingEngine::fail_on`].
    pub fn op(&self) -> &'static str {
        match self {
            EngineCall::ClearModels => "clear_models",
            EngineCall::LoadMesh { .. } => "load_mesh",
            EngineCall::SetMeshTransform { .. } => "set_mesh_transform_matrix",
            EngineCall::SetSun(_) => "set_sun",
            EngineCall::SetCamera(_) => "set_camera",
            EngineCall::Resize { .. } => "resize",
            EngineCall::SetSource { .. } => "set_source",
            EngineCall::LoadShaders => "load_shaders",
            EngineCall::SetFrame(_) => "set_frame",
            EngineCall::SetFxaa(_) => "set_fxaa",
            EngineCall::EnableCubemap(_) => "enable_cubemap",
            EngineCall::ShowCubemap(_) => "show_cubemap",
            EngineCall::ShowTextures(_) => "show_textures",
            EngineCall::ShowPasses(_) => "show_passes",
            EngineCall::ShowHistogram(_) => "show_histogram",
            EngineCall::ShowBoundingBox(_) => "show_bounding_box",
            EngineCall::SetSkyGround(_) => "set_sky_ground",
            EngineCall::SetSkyTurbidity(_) => "set_sky_turbidity",
            EngineCall::AddTexture { .. } => "add_texture",
            EngineCall::AddCubemap { .. } => "add_cubemap",
            EngineCall::SetUniform { .. } => "set_uniform",
            EngineCall::SetOutput(_) => "set_output",
            EngineCall::Draw => "draw",
            EngineCall::Close => "close",
        }
    }
}

/// Call journal shared between several engines, tagged with the engine's label.
#[derive(Clone, Debug, Default)]
pub struct CallLog(Rc<RefCell<Vec<(String, EngineCall)>>>);

impl CallLog {
    /// Empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every entry so far.
    pub fn entries(&self) -> Vec<(String, EngineCall)> {
        self.0.borrow().clone()
    }

    /// `label:op` strings, handy for ordering assertions.
    pub fn ops(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .map(|(label, call)| format!("{label}:{}", call.op()))
            .collect()
    }

    fn push(&self, label: &str, call: EngineCall) {
        self.0.borrow_mut().push((label.to_string(), call));
    }
}

/// In-process engine that records every call instead of rendering.
///
/// Used by tests and as a dry-run backend. Texture and cubemap names are tracked so
/// `have_texture`/`have_cubemap` behave like a real engine; after `close` every call fails.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    label: String,
    calls: Vec<EngineCall>,
    textures: BTreeSet<String>,
    cubemaps: BTreeSet<String>,
    failing: BTreeSet<&'static str>,
    closed: bool,
    journal: Option<CallLog>,
}

impl RecordingEngine {
    /// Unlabelled engine with a private journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that also appends every call to `journal` under `label`.
    pub fn with_journal(label: impl Into<String>, journal: CallLog) -> Self {
        Self {
            label: label.into(),
            journal: Some(journal),
            ..Self::default()
        }
    }

    /// Make every call to operation `op` fail (and go unrecorded).
    pub fn fail_on(mut self, op: &'static str) -> Self {
        self.failing.insert(op);
        self
    }

    /// Calls recorded so far, oldest first.
    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    /// Drain the recorded calls.
    pub fn take_calls(&mut self) -> Vec<EngineCall> {
        std::mem::take(&mut self.calls)
    }

    /// Number of recorded calls to `op`.
    pub fn count(&self, op: &str) -> usize {
        self.calls.iter().filter(|c| c.op() == op).count()
    }

    /// Recorded operation names in order.
    pub fn ops(&self) -> Vec<&'static str> {
        self.calls.iter().map(EngineCall::op).collect()
    }

    /// `true` once `close` succeeded.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn record(&mut self, call: EngineCall) -> EngineResult<()> {
        if self.closed {
            return Err(BridgeError::engine(format!(
                "{} called on a closed engine",
                call.op()
            )));
        }
        if self.failing.contains(call.op()) {
            return Err(BridgeError::engine(format!("{} failed", call.op())));
        }
        if let Some(journal) = &self.journal {
            journal.push(&self.label, call.clone());
        }
        self.calls.push(call);
        Ok(())
    }
}

impl EngineHandle for RecordingEngine {
    fn clear_models(&mut self) -> EngineResult<()> {
        self.record(EngineCall::ClearModels)
    }

    fn load_mesh(&mut self, name: &str, mesh: MeshData) -> EngineResult<()> {
        self.record(EngineCall::LoadMesh {
            name: name.to_string(),
            mesh,
        })
    }

    fn set_mesh_transform_matrix(
        &mut self,
        name: &str,
        matrix: &EngineMatrix,
    ) -> EngineResult<()> {
        self.record(EngineCall::SetMeshTransform {
            name: name.to_string(),
            matrix: *matrix,
        })
    }

    fn set_sun(&mut self, light: &LightState) -> EngineResult<()> {
        self.record(EngineCall::SetSun(*light))
    }

    fn set_camera(&mut self, camera: &CameraState) -> EngineResult<()> {
        self.record(EngineCall::SetCamera(*camera))
    }

    fn resize(&mut self, width: u32, height: u32) -> EngineResult<()> {
        self.record(EngineCall::Resize { width, height })
    }

    fn set_source(&mut self, stage: ShaderStage, source: &str) -> EngineResult<()> {
        self.record(EngineCall::SetSource {
            stage,
            source: source.to_string(),
        })
    }

    fn load_shaders(&mut self) -> EngineResult<()> {
        self.record(EngineCall::LoadShaders)
    }

    fn set_frame(&mut self, frame: i64) -> EngineResult<()> {
        self.record(EngineCall::SetFrame(frame))
    }

    fn set_fxaa(&mut self, enabled: bool) -> EngineResult<()> {
        self.record(EngineCall::SetFxaa(enabled))
    }

    fn enable_cubemap(&mut self, enabled: bool) -> EngineResult<()> {
        self.record(EngineCall::EnableCubemap(enabled))
    }

    fn show_cubemap(&mut self, visible: bool) -> EngineResult<()> {
        self.record(EngineCall::ShowCubemap(visible))
    }

    fn show_textures(&mut self, visible: bool) -> EngineResult<()> {
        self.record(EngineCall::ShowTextures(visible))
    }

    fn show_passes(&mut self, visible: bool) -> EngineResult<()> {
        self.record(EngineCall::ShowPasses(visible))
    }

    fn show_histogram(&mut self, visible: bool) -> EngineResult<()> {
        self.record(EngineCall::ShowHistogram(visible))
    }

    fn show_bounding_box(&mut self, visible: bool) -> EngineResult<()> {
        self.record(EngineCall::ShowBoundingBox(visible))
    }

    fn set_sky_ground(&mut self, color: Rgb) -> EngineResult<()> {
        self.record(EngineCall::SetSkyGround(color))
    }

    fn set_sky_turbidity(&mut self, turbidity: f32) -> EngineResult<()> {
        self.record(EngineCall::SetSkyTurbidity(turbidity))
    }

    fn have_texture(&self, name: &str) -> bool {
        self.textures.contains(name)
    }

    fn add_texture(&mut self, texture: &TextureUpload<'_>) -> EngineResult<()> {
        self.record(EngineCall::AddTexture {
            name: texture.name.to_string(),
            width: texture.width,
            height: texture.height,
            channels: texture.channels,
            upload: texture.source.kind(),
        })?;
        self.textures.insert(texture.name.to_string());
        Ok(())
    }

    fn have_cubemap(&self, name: &str) -> bool {
        self.cubemaps.contains(name)
    }

    fn add_cubemap(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        channels: u32,
        _pixels: &[f32],
    ) -> EngineResult<()> {
        self.record(EngineCall::AddCubemap {
            name: name.to_string(),
            width,
            height,
            channels,
        })?;
        self.cubemaps.insert(name.to_string());
        Ok(())
    }

    fn set_uniform(&mut self, name: &str, values: &[f32]) -> EngineResult<()> {
        self.record(EngineCall::SetUniform {
            name: name.to_string(),
            values: values.to_vec(),
        })
    }

    fn set_output(&mut self, path: &Path) -> EngineResult<()> {
        self.record(EngineCall::SetOutput(path.to_path_buf()))
    }

    fn draw(&mut self) -> EngineResult<()> {
        self.record(EngineCall::Draw)
    }

    fn close(&mut self) -> EngineResult<()> {
        self.record(EngineCall::Close)?;
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/recording.rs"]
mod tests;
