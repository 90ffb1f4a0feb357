//! Pure conversions from host-native scene data into renderer structures.

/// Camera state from viewport matrices or scene intrinsics.
pub mod camera;
/// Light placement.
pub mod light;
/// Host-to-renderer matrix layout.
pub mod matrix;
/// Mesh geometry.
pub mod mesh;

use crate::foundation::core::EngineMatrix;
use crate::foundation::error::BridgeResult;
use crate::host::{ObjectPayload, RenderSettings, SceneObject};

use self::camera::{CameraConstants, CameraState};
use self::light::LightState;
use self::mesh::MeshData;

/// Renderer payload for one scene object.
#[derive(Clone, Debug, PartialEq)]
pub enum TranslatedObject {
    /// A mesh and its world transform.
    Mesh {
        /// Engine-ready mesh.
        mesh: MeshData,
        /// Renderer-layout transform.
        transform: EngineMatrix,
    },
    /// The sun.
    Light(LightState),
    /// A camera.
    Camera(CameraState),
}

/// Translate one object; `Ok(None)` for kinds the renderer has no counterpart for.
pub fn translate_object(
    object: &SceneObject,
    settings: &RenderSettings,
    constants: &CameraConstants,
) -> BridgeResult<Option<TranslatedObject>> {
    let translated = match &object.payload {
        ObjectPayload::Mesh { data, matrix_world } => TranslatedObject::Mesh {
            mesh: mesh::translate_mesh(data)?,
            transform: matrix::to_engine_matrix(matrix_world),
        },
        ObjectPayload::Light(light) => TranslatedObject::Light(light::translate_light(light)),
        ObjectPayload::Camera(cam) => {
            TranslatedObject::Camera(camera::scene_camera(cam, settings, constants))
        }
        ObjectPayload::Unsupported { .. } => return Ok(None),
    };
    Ok(Some(translated))
}

#[cfg(test)]
#[path = "../../tests/unit/translate/mod.rs"]
mod tests;
