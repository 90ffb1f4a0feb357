use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::channel::options::ViewerOptions;
use crate::channel::process::ControlChannel;
use crate::channel::protocol::{Command, Reply, Toggle};
use crate::engine::handle::{EngineHandle, EngineResult, TextureUpload};
use crate::foundation::core::{EngineMatrix, Rgb, ShaderStage};
use crate::foundation::error::{BridgeError, BridgeResult};
use crate::translate::camera::CameraState;
use crate::translate::light::LightState;
use crate::translate::mesh::MeshData;

/// [`EngineHandle`] backed by a glslViewer process driven over its console.
///
/// Operations with a console command are sent as such. Shader sources are written to the files
/// the viewer was launched with and picked up by `reload`. Operations the console has no
/// equivalent for (mesh upload, pixel textures, resize) are logged and accepted.
pub struct RemoteEngine {
    channel: ControlChannel,
    shader_files: BTreeMap<ShaderStage, PathBuf>,
    textures: BTreeSet<String>,
    cubemaps: BTreeSet<String>,
    output: Option<PathBuf>,
}

impl RemoteEngine {
    /// Wrap an existing channel; `shader_files` are the paths the viewer watches per stage.
    pub fn new(channel: ControlChannel, shader_files: BTreeMap<ShaderStage, PathBuf>) -> Self {
        Self {
            channel,
            shader_files,
            textures: BTreeSet::new(),
            cubemaps: BTreeSet::new(),
            output: None,
        }
    }

    /// Build the channel from launch options and start the viewer.
    pub fn launch(opts: &ViewerOptions) -> BridgeResult<Self> {
        let mut shader_files = BTreeMap::new();
        shader_files.insert(ShaderStage::Fragment, opts.fragment.clone());
        if let Some(vertex) = &opts.vertex {
            shader_files.insert(ShaderStage::Vertex, vertex.clone());
        }
        let mut engine = Self::new(ControlChannel::from_options(opts)?, shader_files);
        engine.channel.start()?;
        Ok(engine)
    }

    /// The underlying control channel.
    pub fn channel(&self) -> &ControlChannel {
        &self.channel
    }

    /// Mutable access to the control channel.
    pub fn channel_mut(&mut self) -> &mut ControlChannel {
        &mut self.channel
    }

    fn send(&mut self, cmd: Command) -> EngineResult<()> {
        match self.channel.send(&cmd) {
            Reply::Closed => Err(BridgeError::engine(format!(
                "viewer is not running; dropped '{}'",
                cmd.to_line()
            ))),
            _ => Ok(()),
        }
    }

    fn unsupported(&self, op: &str) -> EngineResult<()> {
        tracing::debug!(op, "no console equivalent; accepted without effect");
        Ok(())
    }
}

impl EngineHandle for RemoteEngine {
    fn clear_models(&mut self) -> EngineResult<()> {
        self.send(Command::ClearModels)
    }

    fn load_mesh(&mut self, name: &str, mesh: MeshData) -> EngineResult<()> {
        tracing::debug!(name, vertices = mesh.vertex_count(), "mesh upload skipped");
        self.unsupported("load_mesh")
    }

    fn set_mesh_transform_matrix(
        &mut self,
        name: &str,
        _matrix: &EngineMatrix,
    ) -> EngineResult<()> {
        tracing::debug!(name, "model transform skipped");
        self.unsupported("set_mesh_transform_matrix")
    }

    fn set_sun(&mut self, light: &LightState) -> EngineResult<()> {
        self.send(Command::LightPosition(light.position))
    }

    fn set_camera(&mut self, camera: &CameraState) -> EngineResult<()> {
        let t = &camera.transform;
        self.send(Command::CameraPosition([t[12], t[13], t[14]]))
    }

    fn resize(&mut self, _width: u32, _height: u32) -> EngineResult<()> {
        self.unsupported("resize")
    }

    fn set_source(&mut self, stage: ShaderStage, source: &str) -> EngineResult<()> {
        let path = self.shader_files.get(&stage).ok_or_else(|| {
            BridgeError::engine(format!(
                "no {} shader file bound to the viewer",
                stage.wire_name()
            ))
        })?;
        std::fs::write(path, source)
            .with_context(|| format!("write shader source '{}'", path.display()))?;
        Ok(())
    }

    fn load_shaders(&mut self) -> EngineResult<()> {
        self.send(Command::Reload(None))
    }

    fn set_frame(&mut self, _frame: i64) -> EngineResult<()> {
        self.unsupported("set_frame")
    }

    fn set_fxaa(&mut self, _enabled: bool) -> EngineResult<()> {
        self.unsupported("set_fxaa")
    }

    fn enable_cubemap(&mut self, enabled: bool) -> EngineResult<()> {
        self.send(Command::Cubemap(enabled.into()))
    }

    fn show_cubemap(&mut self, visible: bool) -> EngineResult<()> {
        self.send(Command::Sky(visible.into()))
    }

    fn show_textures(&mut self, visible: bool) -> EngineResult<()> {
        self.send(Command::Textures(visible.into()))
    }

    fn show_passes(&mut self, visible: bool) -> EngineResult<()> {
        self.send(Command::Buffers(visible.into()))
    }

    fn show_histogram(&mut self, visible: bool) -> EngineResult<()> {
        self.send(Command::Plot(Toggle::from(visible)))
    }

    fn show_bounding_box(&mut self, visible: bool) -> EngineResult<()> {
        self.send(Command::BoundingBoxes(visible.into()))
    }

    fn set_sky_ground(&mut self, color: Rgb) -> EngineResult<()> {
        self.send(Command::SkyboxGround([color.r, color.g, color.b]))
    }

    fn set_sky_turbidity(&mut self, turbidity: f32) -> EngineResult<()> {
        self.send(Command::SkyTurbidity(turbidity))
    }

    fn have_texture(&self, name: &str) -> bool {
        self.textures.contains(name)
    }

    fn add_texture(&mut self, texture: &TextureUpload<'_>) -> EngineResult<()> {
        tracing::debug!(
            name = texture.name,
            upload = ?texture.source.kind(),
            "texture upload skipped"
        );
        self.textures.insert(texture.name.to_string());
        Ok(())
    }

    fn have_cubemap(&self, name: &str) -> bool {
        self.cubemaps.contains(name)
    }

    fn add_cubemap(
        &mut self,
        name: &str,
        _width: u32,
        _height: u32,
        _channels: u32,
        _pixels: &[f32],
    ) -> EngineResult<()> {
        tracing::debug!(name, "cubemap upload skipped");
        self.cubemaps.insert(name.to_string());
        Ok(())
    }

    fn set_uniform(&mut self, name: &str, values: &[f32]) -> EngineResult<()> {
        self.send(Command::uniform(name, values))
    }

    fn set_output(&mut self, path: &Path) -> EngineResult<()> {
        self.output = Some(path.to_path_buf());
        Ok(())
    }

    fn draw(&mut self) -> EngineResult<()> {
        match self.output.clone() {
            Some(path) => self.send(Command::Screenshot(path)),
            None => self.send(Command::Update),
        }
    }

    fn close(&mut self) -> EngineResult<()> {
        if !self.channel.stop() {
            tracing::debug!("viewer already stopped");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/remote.rs"]
mod tests;
