use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::engine::handle::EngineHandle;
use crate::foundation::error::{BridgeError, BridgeResult};
use crate::translate::camera::CameraConstants;

/// Typed engine settings the host adapter edits; push them with [`SyncConfig::apply`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Text buffer / file name bound to the vertex stage.
    pub vertex_shader: String,
    /// Text buffer / file name bound to the fragment stage.
    pub fragment_shader: String,
    /// Directory searched for the shader files.
    pub shader_dir: PathBuf,
    /// Sky turbidity, at least 1.
    pub skybox_turbidity: f32,
    /// Image-based lighting from the environment cubemap.
    pub enable_cubemap: bool,
    /// Show the cubemap as background.
    pub show_cubemap: bool,
    /// Overlay loaded textures.
    pub show_textures: bool,
    /// Overlay render passes.
    pub show_passes: bool,
    /// Overlay the luma histogram.
    pub show_histogram: bool,
    /// Draw bounding boxes.
    pub show_bounding_box: bool,
    /// FXAA.
    pub fxaa: bool,
    /// Camera scale and FOV fudge factors.
    pub camera: CameraConstants,
    /// Copy texture pixels even when a GPU handle could be shared.
    pub force_pixel_upload: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            vertex_shader: "main.vert".to_string(),
            fragment_shader: "main.frag".to_string(),
            shader_dir: PathBuf::from("."),
            skybox_turbidity: 4.0,
            enable_cubemap: true,
            show_cubemap: false,
            show_textures: false,
            show_passes: false,
            show_histogram: false,
            show_bounding_box: false,
            fxaa: false,
            camera: CameraConstants::default(),
            force_pixel_upload: false,
        }
    }
}

impl SyncConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> BridgeResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| BridgeError::serde(format!("parse sync config JSON: {e}")))
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        let f =
            File::open(path).with_context(|| format!("open sync config '{}'", path.display()))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Reject values the engine cannot use.
    pub fn validate(&self) -> BridgeResult<()> {
        if self.vertex_shader.trim().is_empty() || self.fragment_shader.trim().is_empty() {
            return Err(BridgeError::validation("shader file names must be non-empty"));
        }
        if !self.skybox_turbidity.is_finite() || self.skybox_turbidity < 1.0 {
            return Err(BridgeError::validation(format!(
                "skybox_turbidity must be >= 1, got {}",
                self.skybox_turbidity
            )));
        }
        let cam = &self.camera;
        if !(cam.viewport_scale.is_finite() && cam.viewport_scale > 0.0)
            || !(cam.scene_scale.is_finite() && cam.scene_scale > 0.0)
        {
            return Err(BridgeError::validation("camera scales must be positive"));
        }
        if !cam.fov_correction.is_finite() {
            return Err(BridgeError::validation("fov_correction must be finite"));
        }
        Ok(())
    }

    /// Push every engine-level flag. Stops at the first failing call.
    pub fn apply(&self, engine: &mut dyn EngineHandle) -> BridgeResult<()> {
        self.validate()?;
        engine.set_fxaa(self.fxaa)?;
        engine.enable_cubemap(self.enable_cubemap)?;
        engine.show_cubemap(self.show_cubemap)?;
        engine.show_textures(self.show_textures)?;
        engine.show_passes(self.show_passes)?;
        engine.show_histogram(self.show_histogram)?;
        engine.show_bounding_box(self.show_bounding_box)?;
        engine.set_sky_turbidity(self.skybox_turbidity)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sync/config.rs"]
mod tests;
