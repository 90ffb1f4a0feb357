//! Boundary between the bridge and the host application.
//!
//! The host adapter owns the live scene graph and implements [`HostScene`] and [`TextStore`];
//! the synchronizer only reads through these traits and reports back via
//! [`HostScene::request_redraw`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::{HostMatrix, Resolution, Rgb};
use crate::foundation::error::{BridgeError, BridgeResult};

/// One face corner of a triangulated host mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corner {
    /// Index into [`HostMesh::points`].
    pub point: u32,
    /// Split (per-corner) normal.
    pub normal: [f32; 3],
}

/// Host-native mesh geometry in object space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HostMesh {
    /// Point positions.
    pub points: Vec<[f32; 3]>,
    /// Per-point normals.
    pub point_normals: Vec<[f32; 3]>,
    /// Optional custom per-point normal attribute; preferred over `point_normals` for point clouds.
    pub custom_normals: Option<Vec<[f32; 3]>>,
    /// Face corners referenced by `triangles`.
    pub corners: Vec<Corner>,
    /// Triangles as indices into `corners`.
    pub triangles: Vec<[u32; 3]>,
    /// Optional per-corner RGBA colour.
    pub corner_colors: Option<Vec<[f32; 4]>>,
    /// Optional per-corner UV.
    pub corner_uvs: Option<Vec<[f32; 2]>>,
}

/// Host light; only its placement is used.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostLight {
    /// Object-to-world transform.
    pub matrix_world: HostMatrix,
}

/// Which image dimension the sensor size is calibrated against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorFit {
    /// Horizontal unless the image is taller than wide.
    #[default]
    Auto,
    /// Fit to width.
    Horizontal,
    /// Fit to height.
    Vertical,
}

/// Camera projection kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    /// Pinhole camera.
    #[default]
    Perspective,
    /// Parallel projection sized by `ortho_scale`.
    Orthographic,
}

/// Intrinsic camera parameters (lengths in millimetres, shifts in view-factor units).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CameraIntrinsics {
    /// Projection kind.
    pub projection: ProjectionKind,
    /// Sensor fit mode.
    pub sensor_fit: SensorFit,
    /// Sensor width.
    pub sensor_width: f32,
    /// Sensor height.
    pub sensor_height: f32,
    /// Focal length.
    pub focal_length: f32,
    /// Orthographic view size.
    pub ortho_scale: f32,
    /// Near clip distance.
    pub clip_start: f32,
    /// Far clip distance.
    pub clip_end: f32,
    /// Horizontal lens shift.
    pub shift_x: f32,
    /// Vertical lens shift.
    pub shift_y: f32,
}

impl Default for CameraIntrinsics {
    fn default() -> Self {
        Self {
            projection: ProjectionKind::Perspective,
            sensor_fit: SensorFit::Auto,
            sensor_width: 36.0,
            sensor_height: 24.0,
            focal_length: 50.0,
            ortho_scale: 6.0,
            clip_start: 0.1,
            clip_end: 1000.0,
            shift_x: 0.0,
            shift_y: 0.0,
        }
    }
}

/// Scene camera object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostCamera {
    /// Object-to-world transform.
    pub matrix_world: HostMatrix,
    /// Lens and sensor parameters.
    pub intrinsics: CameraIntrinsics,
}

/// Interactive viewport camera, with ready-made matrices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportCamera {
    /// World-to-view matrix.
    pub view_matrix: HostMatrix,
    /// View-to-clip matrix.
    pub projection_matrix: HostMatrix,
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
}

/// Final-render output settings.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderSettings {
    /// Base output resolution.
    pub resolution: Resolution,
    /// Resolution percentage applied to the output size.
    pub percentage: u32,
    /// Horizontal pixel aspect.
    pub pixel_aspect_x: f32,
    /// Vertical pixel aspect.
    pub pixel_aspect_y: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution {
                width: 1920,
                height: 1080,
            },
            percentage: 100,
            pixel_aspect_x: 1.0,
            pixel_aspect_y: 1.0,
        }
    }
}

impl RenderSettings {
    /// Output size after the percentage is applied.
    pub fn output_size(&self) -> Resolution {
        self.resolution.scaled(self.percentage)
    }
}

/// Host image usable as a texture or cubemap.
#[derive(Clone, Debug, PartialEq)]
pub struct HostImage {
    /// Host-side name (sanitized before reaching the engine).
    pub name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channels per pixel (1-4).
    pub channels: u32,
    /// Row-major float pixels, `width * height * channels` long.
    pub pixels: Vec<f32>,
    /// GPU texture name when the image is already resident in the shared context.
    pub gpu_handle: Option<u32>,
}

/// Kind-specific payload of a scene object.
#[derive(Clone, Debug, PartialEq)]
pub enum ObjectPayload {
    /// Polygon mesh.
    Mesh {
        /// Object-space geometry.
        data: HostMesh,
        /// Object-to-world transform.
        matrix_world: HostMatrix,
    },
    /// Light source.
    Light(HostLight),
    /// Scene camera.
    Camera(HostCamera),
    /// Any host type the bridge does not know how to mirror.
    Unsupported {
        /// Host type name, for logs.
        kind: String,
    },
}

/// Coarse object kind tracked in sync records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Mesh object.
    Mesh,
    /// Light object.
    Light,
    /// Camera object.
    Camera,
}

/// A visible scene graph node.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneObject {
    /// Unique node name.
    pub id: String,
    /// Kind-specific data.
    pub payload: ObjectPayload,
}

impl SceneObject {
    /// Kind of the payload, `None` for unsupported host types.
    pub fn kind(&self) -> Option<ObjectKind> {
        match self.payload {
            ObjectPayload::Mesh { .. } => Some(ObjectKind::Mesh),
            ObjectPayload::Light(_) => Some(ObjectKind::Light),
            ObjectPayload::Camera(_) => Some(ObjectKind::Camera),
            ObjectPayload::Unsupported { .. } => None,
        }
    }
}

/// Change notification emitted by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum ChangeEvent {
    /// Data of one object changed.
    Object {
        /// Node name.
        id: String,
        /// Geometry was edited.
        geometry: bool,
        /// Transform was edited.
        transform: bool,
    },
    /// A collection (hierarchy) changed: objects may have been added or removed.
    Collection {
        /// Collection name.
        name: String,
    },
    /// World/environment settings changed.
    World {
        /// Sky ground colour.
        sky_ground: Rgb,
        /// Sky turbidity.
        turbidity: f32,
    },
    /// An image datablock changed.
    Image {
        /// Image name.
        name: String,
    },
    /// Anything else the host reports.
    Other {
        /// Datablock name, for logs.
        name: String,
    },
}

impl ChangeEvent {
    /// Object event helper.
    pub fn object(id: impl Into<String>, geometry: bool, transform: bool) -> Self {
        ChangeEvent::Object {
            id: id.into(),
            geometry,
            transform,
        }
    }
}

/// Named text buffers the host exposes (shader sources live here).
pub trait TextStore {
    /// `true` when a buffer called `name` exists.
    fn contains(&self, name: &str) -> bool;
    /// Current in-memory contents.
    fn contents(&self, name: &str) -> Option<String>;
    /// `true` when the buffer is backed by a file that changed on disk since it was loaded.
    fn is_externally_modified(&self, name: &str) -> bool;
    /// Replace the buffer with the file's current contents, discarding in-memory edits.
    fn reload_from_disk(&mut self, name: &str) -> BridgeResult<()>;
    /// Open `path` as a file-backed buffer named after its file name.
    fn open_file(&mut self, path: &Path) -> BridgeResult<()>;
    /// Create (or overwrite) an in-memory buffer.
    fn create(&mut self, name: &str, text: &str);
}

/// Read access to the host scene plus the redraw hook.
pub trait HostScene {
    /// Visible object instances in host enumeration order.
    fn visible_instances(&self) -> Box<dyn Iterator<Item = &SceneObject> + '_>;
    /// Look up one object by id.
    fn object(&self, id: &str) -> Option<&SceneObject>;
    /// Interactive viewport camera, when rendering into a viewport.
    fn viewport(&self) -> Option<ViewportCamera>;
    /// Active scene camera used for final renders.
    fn active_camera(&self) -> Option<&HostCamera>;
    /// Output settings.
    fn render_settings(&self) -> RenderSettings;
    /// Images to expose as textures.
    fn images(&self) -> Box<dyn Iterator<Item = &HostImage> + '_>;
    /// World environment image, uploaded as a cubemap.
    fn environment(&self) -> Option<&HostImage>;
    /// Current timeline frame.
    fn current_frame(&self) -> i64;
    /// Ask the host to redraw the view.
    fn request_redraw(&mut self);
    /// Text buffers holding shader sources.
    fn texts(&mut self) -> &mut dyn TextStore;
}

#[derive(Clone, Debug)]
struct Buffer {
    text: String,
    file: Option<PathBuf>,
    disk_text: Option<String>,
}

/// In-memory [`TextStore`] whose buffers may be backed by files.
///
/// A file-backed buffer counts as externally modified when the file's bytes differ from what
/// was last loaded.
#[derive(Clone, Debug, Default)]
pub struct MemoryTextStore {
    buffers: BTreeMap<String, Buffer>,
}

impl MemoryTextStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Edit a buffer in memory, as a user typing in the host editor would.
    pub fn edit(&mut self, name: &str, text: &str) -> BridgeResult<()> {
        let buffer = self
            .buffers
            .get_mut(name)
            .ok_or_else(|| BridgeError::validation(format!("no text buffer named '{name}'")))?;
        buffer.text = text.to_string();
        Ok(())
    }

    /// Backing file of a buffer, if any.
    pub fn file_of(&self, name: &str) -> Option<&Path> {
        self.buffers.get(name).and_then(|b| b.file.as_deref())
    }

    /// Buffer names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.buffers.keys().map(String::as_str)
    }
}

impl TextStore for MemoryTextStore {
    fn contains(&self, name: &str) -> bool {
        self.buffers.contains_key(name)
    }

    fn contents(&self, name: &str) -> Option<String> {
        self.buffers.get(name).map(|b| b.text.clone())
    }

    fn is_externally_modified(&self, name: &str) -> bool {
        let Some(Buffer {
            file: Some(path),
            disk_text,
            ..
        }) = self.buffers.get(name)
        else {
            return false;
        };
        match std::fs::read_to_string(path) {
            Ok(on_disk) => disk_text.as_deref() != Some(on_disk.as_str()),
            Err(_) => false,
        }
    }

    fn reload_from_disk(&mut self, name: &str) -> BridgeResult<()> {
        let buffer = self
            .buffers
            .get_mut(name)
            .ok_or_else(|| BridgeError::validation(format!("no text buffer named '{name}'")))?;
        let Some(path) = buffer.file.as_ref() else {
            return Err(BridgeError::validation(format!(
                "text buffer '{name}' is not backed by a file"
            )));
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reload '{}'", path.display()))?;
        buffer.text = text.clone();
        buffer.disk_text = Some(text);
        Ok(())
    }

    fn open_file(&mut self, path: &Path) -> BridgeResult<()> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                BridgeError::validation(format!("'{}' has no file name", path.display()))
            })?;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("open '{}'", path.display()))?;
        self.buffers.insert(
            name,
            Buffer {
                text: text.clone(),
                file: Some(path.to_path_buf()),
                disk_text: Some(text),
            },
        );
        Ok(())
    }

    fn create(&mut self, name: &str, text: &str) {
        self.buffers.insert(
            name.to_string(),
            Buffer {
                text: text.to_string(),
                file: None,
                disk_text: None,
            },
        );
    }
}

/// Self-contained [`HostScene`] for tests and headless drivers.
///
/// Objects are kept in insertion order, which is the order `visible_instances` reports.
#[derive(Clone, Debug, Default)]
pub struct MemoryScene {
    /// Visible objects, in host order.
    pub objects: Vec<SceneObject>,
    /// Interactive viewport, if any.
    pub viewport: Option<ViewportCamera>,
    /// Active scene camera.
    pub camera: Option<HostCamera>,
    /// Output settings.
    pub settings: RenderSettings,
    /// Texture images.
    pub images: Vec<HostImage>,
    /// Environment image.
    pub environment: Option<HostImage>,
    /// Current frame.
    pub frame: i64,
    /// Shader text buffers.
    pub texts: MemoryTextStore,
    redraws: usize,
}

impl MemoryScene {
    /// Empty scene with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object, replacing any object with the same id in place.
    pub fn upsert(&mut self, object: SceneObject) {
        match self.objects.iter_mut().find(|o| o.id == object.id) {
            Some(slot) => *slot = object,
            None => self.objects.push(object),
        }
    }

    /// Remove an object; returns it when it existed.
    pub fn remove(&mut self, id: &str) -> Option<SceneObject> {
        let idx = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(idx))
    }

    /// Mutable access to an object by id.
    pub fn object_mut(&mut self, id: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Number of redraws requested so far.
    pub fn redraw_count(&self) -> usize {
        self.redraws
    }
}

impl HostScene for MemoryScene {
    fn visible_instances(&self) -> Box<dyn Iterator<Item = &SceneObject> + '_> {
        Box::new(self.objects.iter())
    }

    fn object(&self, id: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    fn viewport(&self) -> Option<ViewportCamera> {
        self.viewport
    }

    fn active_camera(&self) -> Option<&HostCamera> {
        self.camera.as_ref()
    }

    fn render_settings(&self) -> RenderSettings {
        self.settings
    }

    fn images(&self) -> Box<dyn Iterator<Item = &HostImage> + '_> {
        Box::new(self.images.iter())
    }

    fn environment(&self) -> Option<&HostImage> {
        self.environment.as_ref()
    }

    fn current_frame(&self) -> i64 {
        self.frame
    }

    fn request_redraw(&mut self) {
        self.redraws += 1;
    }

    fn texts(&mut self) -> &mut dyn TextStore {
        &mut self.texts
    }
}

#[cfg(test)]
#[path = "../tests/unit/host.rs"]
mod tests;
