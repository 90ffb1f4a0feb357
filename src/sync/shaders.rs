use std::collections::BTreeMap;
use std::path::Path;

use crate::engine::handle::EngineHandle;
use crate::foundation::core::ShaderStage;
use crate::foundation::error::BridgeResult;
use crate::host::TextStore;

/// Vertex stage used when the bound file does not exist.
pub const DEFAULT_VERTEX_SHADER: &str = r#"#ifdef GL_ES
precision mediump float;
#endif

uniform mat4 u_modelViewProjectionMatrix;

attribute vec4 a_position;
varying vec4 v_position;

#ifdef MODEL_HAS_COLORS
attribute vec4 a_color;
varying vec4 v_color;
#endif

#ifdef MODEL_HAS_NORMALS
attribute vec3 a_normal;
varying vec3 v_normal;
#endif

#ifdef MODEL_HAS_TEXCOORDS
attribute vec2 a_texcoord;
varying vec2 v_texcoord;
#endif

#ifdef MODEL_HAS_TANGENTS
attribute vec4 a_tangent;
varying vec4 v_tangent;
#endif

void main(void) {
    v_position = a_position;
#ifdef MODEL_HAS_COLORS
    v_color = a_color;
#endif
#ifdef MODEL_HAS_NORMALS
    v_normal = a_normal;
#endif
#ifdef MODEL_HAS_TEXCOORDS
    v_texcoord = a_texcoord;
#endif
#ifdef MODEL_HAS_TANGENTS
    v_tangent = a_tangent;
#endif
    gl_Position = u_modelViewProjectionMatrix * v_position;
}
"#;

/// Fragment stage used when the bound file does not exist: flat diffuse lit by `u_light`.
pub const DEFAULT_FRAGMENT_SHADER: &str = r#"#ifdef GL_ES
precision mediump float;
#endif

uniform vec3 u_light;
uniform vec2 u_resolution;

varying vec4 v_position;

#ifdef MODEL_HAS_COLORS
varying vec4 v_color;
#endif

#ifdef MODEL_HAS_NORMALS
varying vec3 v_normal;
#endif

void main(void) {
    vec4 color = vec4(1.0);
#ifdef MODEL_HAS_COLORS
    color = v_color;
#endif
#ifdef MODEL_HAS_NORMALS
    vec3 l = normalize(u_light - v_position.xyz);
    color.rgb *= 0.25 + 0.75 * max(dot(normalize(v_normal), l), 0.0);
#endif
    gl_FragColor = color;
}
"#;

/// Built-in source for `stage`.
pub fn default_source(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => DEFAULT_VERTEX_SHADER,
        ShaderStage::Fragment => DEFAULT_FRAGMENT_SHADER,
    }
}

/// Per-stage binding between a host text buffer and what the engine last compiled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShaderSourceState {
    /// Text buffer / file name bound to the stage.
    pub bound_filename: String,
    /// Text last pushed with `set_source`; `None` before the first push.
    pub cached_text: Option<String>,
}

/// Hot-reload tracker for the vertex/fragment text buffers.
#[derive(Clone, Debug, Default)]
pub struct ShaderSourceTracker {
    stages: BTreeMap<ShaderStage, ShaderSourceState>,
}

impl ShaderSourceTracker {
    /// Track the given vertex and fragment buffer names.
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        let mut tracker = Self::default();
        tracker.rebind(vertex, fragment);
        tracker
    }

    /// Point the stages at other buffers and forget what was pushed.
    pub fn rebind(&mut self, vertex: impl Into<String>, fragment: impl Into<String>) {
        self.stages.clear();
        for (stage, name) in [
            (ShaderStage::Vertex, vertex.into()),
            (ShaderStage::Fragment, fragment.into()),
        ] {
            self.stages.insert(
                stage,
                ShaderSourceState {
                    bound_filename: name,
                    cached_text: None,
                },
            );
        }
    }

    /// Tracking state of one stage.
    pub fn state(&self, stage: ShaderStage) -> Option<&ShaderSourceState> {
        self.stages.get(&stage)
    }

    /// Forget cached text so the next tick pushes both stages.
    pub fn invalidate(&mut self) {
        for state in self.stages.values_mut() {
            state.cached_text = None;
        }
    }

    /// Make sure a text buffer exists for each stage.
    ///
    /// Existing buffers are left alone. A file of the bound name under `dir` is opened;
    /// otherwise a buffer holding the built-in default source is created.
    pub fn bind(&self, texts: &mut dyn TextStore, dir: &Path) -> BridgeResult<()> {
        for (stage, state) in &self.stages {
            let name = state.bound_filename.as_str();
            if texts.contains(name) {
                continue;
            }
            let path = dir.join(name);
            if path.is_file() {
                texts.open_file(&path)?;
                tracing::info!(path = %path.display(), "bound shader file");
            } else {
                tracing::info!(
                    name,
                    stage = stage.wire_name(),
                    "shader file missing; using built-in default"
                );
                texts.create(name, default_source(*stage));
            }
        }
        Ok(())
    }

    /// Push edited stages to the engine.
    ///
    /// Buffers whose backing file changed on disk are reloaded first, discarding in-memory
    /// edits. Every stage whose text differs from the cache (or every stage, with `force`) gets
    /// `set_source`; `load_shaders` then runs once if anything was pushed. Returns whether it
    /// ran. Engine failures are logged and not retried.
    #[tracing::instrument(skip(self, engine, texts))]
    pub fn tick(
        &mut self,
        engine: &mut dyn EngineHandle,
        texts: &mut dyn TextStore,
        force: bool,
    ) -> bool {
        let mut changed = false;
        for stage in ShaderStage::ALL {
            let Some(state) = self.stages.get_mut(&stage) else {
                continue;
            };
            let name = state.bound_filename.as_str();

            if texts.is_externally_modified(name) {
                match texts.reload_from_disk(name) {
                    Ok(()) => tracing::info!(name, "shader file changed on disk; reloaded"),
                    Err(e) => tracing::warn!(name, error = %e, "failed to reload shader file"),
                }
            }

            let Some(text) = texts.contents(name) else {
                continue;
            };
            if !force && state.cached_text.as_deref() == Some(text.as_str()) {
                continue;
            }

            if let Err(e) = engine.set_source(stage, &text) {
                tracing::warn!(stage = stage.wire_name(), error = %e, "set_source failed");
            }
            state.cached_text = Some(text);
            changed = true;
        }

        if changed {
            if let Err(e) = engine.load_shaders() {
                tracing::warn!(error = %e, "load_shaders failed");
            }
        }
        changed
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sync/shaders.rs"]
mod tests;
