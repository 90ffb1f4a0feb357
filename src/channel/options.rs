use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{BridgeError, BridgeResult};

/// Executable launched when no override is given.
pub const DEFAULT_PROGRAM: &str = "glslViewer";

/// Uniform value accepted in launch options.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum UniformValue {
    /// Single float.
    Scalar(f32),
    /// Vector of floats.
    Vector(Vec<f32>),
    /// Explicitly typed scalar (`{"type": "int", "value": 3.7}` sends `3`).
    Typed {
        /// `int` or `float`.
        #[serde(rename = "type")]
        kind: UniformKind,
        /// Raw value before conversion.
        value: f64,
    },
}

/// Scalar type of a [`UniformValue::Typed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniformKind {
    /// Truncated towards zero.
    Int,
    /// Sent as is.
    Float,
}

impl UniformValue {
    /// Components to send on the wire.
    pub fn components(&self) -> Vec<f32> {
        match self {
            UniformValue::Scalar(v) => vec![*v],
            UniformValue::Vector(v) => v.clone(),
            UniformValue::Typed {
                kind: UniformKind::Int,
                value,
            } => vec![value.trunc() as f32],
            UniformValue::Typed {
                kind: UniformKind::Float,
                value,
            } => vec![*value as f32],
        }
    }
}

/// Launch options for a glslViewer process.
///
/// Every field is optional; unset fields add no argument.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ViewerOptions {
    /// Executable to run (defaults to [`DEFAULT_PROGRAM`]).
    pub program: Option<String>,
    /// Fragment shader file, always passed.
    pub fragment: PathBuf,
    /// Geometry file (`.ply`, `.obj`, ...).
    pub geometry: Option<PathBuf>,
    /// Vertex shader file.
    pub vertex: Option<PathBuf>,
    /// Run without a window.
    pub headless: bool,
    /// Keep the viewer alive reading commands from stdin.
    pub lifecode: bool,
    /// Show the cursor (`Some(false)` adds `--nocursor`).
    pub cursor: Option<bool>,
    /// Enable FXAA.
    pub fxaa: bool,
    /// Do not throttle redraws.
    pub full_fps: bool,
    /// Verbose logging inside the viewer.
    pub verbose: bool,
    /// Window x position.
    pub x: Option<i32>,
    /// Window y position.
    pub y: Option<i32>,
    /// Square window size; overrides `width`/`height`.
    pub size: Option<u32>,
    /// Window width.
    pub width: Option<u32>,
    /// Window height.
    pub height: Option<u32>,
    /// Extra arguments appended verbatim.
    pub extra_arguments: Vec<String>,
    /// `-D` defines.
    pub defines: Vec<String>,
    /// `-I` include folders.
    pub include_folders: Vec<PathBuf>,
    /// Textures by uniform name.
    pub textures: BTreeMap<String, PathBuf>,
    /// Vertically flipped textures by uniform name.
    pub textures_vflipped: BTreeMap<String, PathBuf>,
    /// Uniforms pushed right after the process starts.
    pub uniforms: BTreeMap<String, UniformValue>,
}

impl ViewerOptions {
    /// Options for a fragment shader with everything else unset.
    pub fn new(fragment: impl Into<PathBuf>) -> Self {
        Self {
            fragment: fragment.into(),
            ..Self::default()
        }
    }

    /// Load options from a JSON file.
    pub fn from_path(path: &Path) -> BridgeResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read viewer options '{}'", path.display()))?;
        serde_json::from_slice(&bytes).map_err(|e| BridgeError::serde(e.to_string()))
    }

    /// Reject options that cannot produce a meaningful command line.
    pub fn validate(&self) -> BridgeResult<()> {
        if self.fragment.as_os_str().is_empty() {
            return Err(BridgeError::validation(
                "viewer options need a fragment shader",
            ));
        }
        if matches!(self.size, Some(0))
            || matches!(self.width, Some(0))
            || matches!(self.height, Some(0))
        {
            return Err(BridgeError::validation("window size must be non-zero"));
        }
        Ok(())
    }

    /// Program followed by its arguments.
    pub fn to_argv(&self) -> Vec<String> {
        let mut argv = vec![
            self.program
                .clone()
                .unwrap_or_else(|| DEFAULT_PROGRAM.to_string()),
        ];

        if let Some(geometry) = &self.geometry {
            argv.push(geometry.display().to_string());
        }
        if let Some(vertex) = &self.vertex {
            argv.push(vertex.display().to_string());
        }
        argv.push(self.fragment.display().to_string());

        if self.headless {
            argv.push("--headless".into());
        }
        if self.lifecode {
            argv.push("-l".into());
        }
        if self.cursor == Some(false) {
            argv.push("--nocursor".into());
        }
        if self.fxaa {
            argv.push("--fxaa".into());
        }
        if self.full_fps {
            argv.push("--fullFps".into());
        }
        if self.verbose {
            argv.push("-v".into());
        }
        if let Some(x) = self.x {
            argv.extend(["-x".to_string(), x.to_string()]);
        }
        if let Some(y) = self.y {
            argv.extend(["-y".to_string(), y.to_string()]);
        }

        match self.size {
            Some(size) => argv.extend([
                "--width".to_string(),
                size.to_string(),
                "--height".to_string(),
                size.to_string(),
            ]),
            None => {
                if let Some(w) = self.width {
                    argv.extend(["--width".to_string(), w.to_string()]);
                }
                if let Some(h) = self.height {
                    argv.extend(["--height".to_string(), h.to_string()]);
                }
            }
        }

        argv.extend(self.extra_arguments.iter().cloned());
        argv.extend(self.defines.iter().map(|d| format!("-D{d}")));
        argv.extend(
            self.include_folders
                .iter()
                .map(|f| format!("-I{}", f.display())),
        );

        for (name, path) in &self.textures {
            argv.extend([format!("-{name}"), path.display().to_string()]);
        }
        if !self.textures_vflipped.is_empty() {
            argv.push("-vFlip".into());
            for (name, path) in &self.textures_vflipped {
                argv.extend([format!("-{name}"), path.display().to_string()]);
            }
        }

        argv
    }
}

#[cfg(test)]
#[path = "../../tests/unit/channel/options.rs"]
mod tests;
