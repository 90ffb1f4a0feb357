use crate::foundation::core::EngineMatrix;
use crate::foundation::error::{BridgeError, BridgeResult};
use crate::foundation::math::invert_host;
use crate::host::{
    CameraIntrinsics, HostCamera, ProjectionKind, RenderSettings, SensorFit, ViewportCamera,
};
use crate::translate::matrix::to_engine_matrix;

/// Output scale for cameras taken from the interactive viewport.
pub const VIEWPORT_CAMERA_SCALE: f32 = 0.5;
/// Output scale for cameras derived from scene intrinsics.
pub const SCENE_CAMERA_SCALE: f32 = 1.0;
/// Empirical FOV correction, in radians, added to derived FOVs when enabled.
pub const SCENE_FOV_CORRECTION: f32 = 0.328;

/// Camera fudge factors. These are uncalibrated; keep them overridable rather than derived.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CameraConstants {
    /// Output scale for viewport cameras.
    pub viewport_scale: f32,
    /// Output scale for scene cameras.
    pub scene_scale: f32,
    /// Radians added to derived FOVs when enabled.
    pub fov_correction: f32,
    /// Off by default.
    pub apply_fov_correction: bool,
}

impl Default for CameraConstants {
    fn default() -> Self {
        Self {
            viewport_scale: VIEWPORT_CAMERA_SCALE,
            scene_scale: SCENE_CAMERA_SCALE,
            fov_correction: SCENE_FOV_CORRECTION,
            apply_fov_correction: false,
        }
    }
}

/// Camera as pushed to the engine.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CameraState {
    /// Camera-to-world transform, renderer layout.
    pub transform: EngineMatrix,
    /// Projection, renderer layout.
    pub projection: EngineMatrix,
    /// Output scale.
    pub scale: f32,
    /// `(near, far)`, only known on the intrinsics path.
    pub clip: Option<(f32, f32)>,
    /// Field of view along the fitted sensor axis in radians, only known on the intrinsics path.
    pub fov: Option<f32>,
}

/// Camera from the interactive viewport: ready-made matrices, inverted view.
pub fn viewport_camera(
    viewport: &ViewportCamera,
    constants: &CameraConstants,
) -> BridgeResult<CameraState> {
    let camera_to_world = invert_host(&viewport.view_matrix)
        .ok_or_else(|| BridgeError::translation("viewport view matrix is not invertible"))?;
    Ok(CameraState {
        transform: to_engine_matrix(&camera_to_world),
        projection: to_engine_matrix(&viewport.projection_matrix),
        scale: constants.viewport_scale,
        clip: None,
        fov: None,
    })
}

/// Camera derived from a scene camera's intrinsics, for final renders.
pub fn scene_camera(
    camera: &HostCamera,
    settings: &RenderSettings,
    constants: &CameraConstants,
) -> CameraState {
    let size = settings.output_size();
    let intr = &camera.intrinsics;
    let projection = frustum_projection(
        intr,
        size.width,
        size.height,
        settings.pixel_aspect_x,
        settings.pixel_aspect_y,
    );

    let fit = resolve_fit(
        intr.sensor_fit,
        size.width,
        size.height,
        settings.pixel_aspect_x,
        settings.pixel_aspect_y,
    );
    let mut fov = 2.0 * (sensor_size(intr, fit) / (2.0 * intr.focal_length)).atan();
    if constants.apply_fov_correction {
        fov += constants.fov_correction;
    }

    CameraState {
        transform: to_engine_matrix(&camera.matrix_world),
        projection,
        scale: constants.scene_scale,
        clip: Some((intr.clip_start, intr.clip_end)),
        fov: Some(fov),
    }
}

/// Resolve `Auto` against the output shape.
pub fn resolve_fit(
    fit: SensorFit,
    width: u32,
    height: u32,
    aspect_x: f32,
    aspect_y: f32,
) -> SensorFit {
    match fit {
        SensorFit::Auto => {
            if aspect_x * width as f32 >= aspect_y * height as f32 {
                SensorFit::Horizontal
            } else {
                SensorFit::Vertical
            }
        }
        explicit => explicit,
    }
}

fn sensor_size(intr: &CameraIntrinsics, fit: SensorFit) -> f32 {
    match fit {
        SensorFit::Vertical => intr.sensor_height,
        SensorFit::Horizontal | SensorFit::Auto => intr.sensor_width,
    }
}

/// Off-axis projection derived from camera intrinsics, column-major (`m[col][row]`).
///
/// Orthographic cameras size the view plane by `ortho_scale` but still go through the same
/// perspective construction.
pub fn frustum_projection(
    intr: &CameraIntrinsics,
    width: u32,
    height: u32,
    aspect_x: f32,
    aspect_y: f32,
) -> EngineMatrix {
    let (w, h) = (width as f32, height as f32);
    let fit = resolve_fit(intr.sensor_fit, width, height, aspect_x, aspect_y);
    let aspect_correction = aspect_y / aspect_x;
    let near = intr.clip_start;
    let far = intr.clip_end;

    let mut pixel_size = match intr.projection {
        ProjectionKind::Orthographic => intr.ortho_scale,
        ProjectionKind::Perspective => sensor_size(intr, fit) * near / intr.focal_length,
    };
    let view_factor = match fit {
        SensorFit::Vertical => aspect_correction * h,
        SensorFit::Horizontal | SensorFit::Auto => w,
    };
    pixel_size /= view_factor;

    let dx = intr.shift_x * view_factor * pixel_size;
    let dy = intr.shift_y * view_factor * pixel_size;
    let xmin = -0.5 * w * pixel_size + dx;
    let xmax = 0.5 * w * pixel_size + dx;
    let ymin = -0.5 * aspect_correction * h * pixel_size + dy;
    let ymax = 0.5 * aspect_correction * h * pixel_size + dy;

    let mut m = [0.0; 16];
    let at = |col: usize, row: usize| col * 4 + row;
    m[at(0, 0)] = 2.0 * near / (xmax - xmin);
    m[at(1, 1)] = 2.0 * near / (ymax - ymin);
    m[at(2, 0)] = (xmax + xmin) / (xmax - xmin);
    m[at(2, 1)] = (ymax + ymin) / (ymax - ymin);
    m[at(2, 2)] = -(far + near) / (far - near);
    m[at(2, 3)] = -1.0;
    m[at(3, 2)] = -2.0 * far * near / (far - near);
    m
}

#[cfg(test)]
#[path = "../../tests/unit/translate/camera.rs"]
mod tests;
