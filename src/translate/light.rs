use crate::foundation::math::host_translation;
use crate::host::HostLight;

/// Light as pushed to the engine: a world-space position and nothing else.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct LightState {
    /// World position of the sun.
    pub position: [f32; 3],
}

/// World location of the light with every axis negated, matching mesh vertices.
pub fn translate_light(light: &HostLight) -> LightState {
    LightState {
        position: (-host_translation(&light.matrix_world)).to_array(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/translate/light.rs"]
mod tests;
