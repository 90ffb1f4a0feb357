use std::collections::BTreeSet;
use std::path::Path;

use crate::engine::handle::EngineHandle;
use crate::foundation::core::{EngineMatrix, ExecutionMode};
use crate::foundation::error::BridgeResult;
use crate::host::{ChangeEvent, HostScene, ObjectKind, ObjectPayload};
use crate::session::EngineContext;
use crate::sync::config::SyncConfig;
use crate::sync::records::{ObjectRecords, ObjectState};
use crate::sync::resources::ResourceCache;
use crate::sync::shaders::ShaderSourceTracker;
use crate::translate::camera::{scene_camera, viewport_camera};
use crate::translate::light::{LightState, translate_light};
use crate::translate::matrix::to_engine_matrix;
use crate::translate::{TranslatedObject, translate_object};

/// What one [`SceneSynchronizer::apply_events`] batch did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// A full rebuild ran.
    pub rebuilt: bool,
    /// Transform-only updates pushed.
    pub transforms: usize,
    /// Light/camera updates pushed outside a rebuild.
    pub object_updates: usize,
    /// World (sky) updates pushed.
    pub world_updates: usize,
    /// Textures uploaded for image events.
    pub uploads: usize,
    /// Events ignored (unsupported kinds, unknown ids, redundant after a rebuild).
    pub skipped: usize,
    /// A redraw was requested from the host.
    pub redraw: bool,
}

enum ObjectAction {
    Rebuild,
    Transform(EngineMatrix),
    Sun(LightState),
    Camera,
    Skip,
}

/// Turns host change events into the smallest ordered set of engine mutations.
///
/// Runs on the host's update thread; the engine is borrowed per call. Engine failures are
/// logged and never retried, so the engine may miss state until the next rebuild.
pub struct SceneSynchronizer {
    config: SyncConfig,
    mode: ExecutionMode,
    records: ObjectRecords,
    resources: ResourceCache,
    shaders: ShaderSourceTracker,
    viewport_size: Option<(u32, u32)>,
}

impl SceneSynchronizer {
    /// Validate `config` and build a preview-mode synchronizer with empty records.
    pub fn new(config: SyncConfig) -> BridgeResult<Self> {
        config.validate()?;
        let shaders = ShaderSourceTracker::new(&config.vertex_shader, &config.fragment_shader);
        let resources = ResourceCache::new().with_pixel_upload(config.force_pixel_upload);
        Ok(Self {
            config,
            mode: ExecutionMode::Preview,
            records: ObjectRecords::new(),
            resources,
            shaders,
            viewport_size: None,
        })
    }

    /// Switch the execution mode.
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Current execution mode.
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Active configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Per-object records.
    pub fn records(&self) -> &ObjectRecords {
        &self.records
    }

    /// Texture and cubemap cache.
    pub fn resources(&self) -> &ResourceCache {
        &self.resources
    }

    /// Shader source tracker.
    pub fn shaders(&self) -> &ShaderSourceTracker {
        &self.shaders
    }

    /// Replace the configuration and push it to the engine.
    ///
    /// Changing the shader names rebinds the tracker; the next tick pushes the new buffers.
    pub fn set_config(
        &mut self,
        engine: &mut dyn EngineHandle,
        host: &mut dyn HostScene,
        config: SyncConfig,
    ) -> BridgeResult<()> {
        config.apply(engine)?;
        if config.vertex_shader != self.config.vertex_shader
            || config.fragment_shader != self.config.fragment_shader
        {
            self.shaders
                .rebind(&config.vertex_shader, &config.fragment_shader);
            self.shaders.bind(host.texts(), &config.shader_dir)?;
        }
        self.config = config;
        host.request_redraw();
        Ok(())
    }

    /// First contact with a fresh engine: push config, bind shader buffers, load the scene.
    pub fn start(
        &mut self,
        engine: &mut dyn EngineHandle,
        host: &mut dyn HostScene,
    ) -> BridgeResult<()> {
        self.config.apply(engine)?;
        self.shaders.bind(host.texts(), &self.config.shader_dir)?;
        self.rebuild(engine, host);
        host.request_redraw();
        Ok(())
    }

    /// Apply a batch of host change events in order.
    ///
    /// The host scene is a snapshot taken after every event in the batch, so once a rebuild
    /// has run the remaining object and collection events have nothing left to do.
    pub fn apply_events(
        &mut self,
        engine: &mut dyn EngineHandle,
        host: &mut dyn HostScene,
        events: &[ChangeEvent],
    ) -> SyncReport {
        let mut report = SyncReport::default();
        for event in events {
            match event {
                ChangeEvent::Object {
                    id,
                    geometry,
                    transform,
                } => {
                    if report.rebuilt {
                        report.skipped += 1;
                        continue;
                    }
                    self.apply_object_event(
                        engine,
                        host,
                        id,
                        *geometry,
                        *transform,
                        &mut report,
                    );
                }
                ChangeEvent::Collection { name } => {
                    if report.rebuilt {
                        report.skipped += 1;
                        continue;
                    }
                    tracing::debug!(collection = %name, "hierarchy changed");
                    self.rebuild(engine, host);
                    report.rebuilt = true;
                }
                ChangeEvent::World {
                    sky_ground,
                    turbidity,
                } => {
                    if let Err(e) = engine.set_sky_ground(*sky_ground) {
                        tracing::warn!(error = %e, "set_sky_ground failed");
                    }
                    if let Err(e) = engine.set_sky_turbidity(*turbidity) {
                        tracing::warn!(error = %e, "set_sky_turbidity failed");
                    }
                    report.world_updates += 1;
                }
                ChangeEvent::Image { name } => {
                    let image = host.images().find(|img| &img.name == name);
                    let mode = self.mode;
                    match image.map(|img| self.resources.ensure_texture(engine, img, mode)) {
                        Some(Ok(true)) => report.uploads += 1,
                        Some(Ok(false)) => {}
                        Some(Err(e)) => {
                            tracing::warn!(image = %name, error = %e, "texture upload failed");
                        }
                        None => report.skipped += 1,
                    }
                }
                ChangeEvent::Other { name } => {
                    tracing::debug!(datablock = %name, "ignoring unrelated change");
                    report.skipped += 1;
                }
            }
        }

        let touched = report.rebuilt
            || report.transforms > 0
            || report.object_updates > 0
            || report.world_updates > 0
            || report.uploads > 0;
        if touched {
            host.request_redraw();
            report.redraw = true;
        }
        report
    }

    fn apply_object_event(
        &mut self,
        engine: &mut dyn EngineHandle,
        host: &mut dyn HostScene,
        id: &str,
        geometry: bool,
        transform: bool,
        report: &mut SyncReport,
    ) {
        let action = match host.object(id).map(|o| &o.payload) {
            None if self.records.get(id).is_some() => {
                tracing::debug!(id, "tracked object vanished; rebuilding");
                ObjectAction::Rebuild
            }
            None => ObjectAction::Skip,
            Some(ObjectPayload::Mesh { matrix_world, .. }) => {
                let known = self.records.state(id) != ObjectState::Unknown;
                if geometry || !known {
                    self.records.mark_geometry_dirty(id, ObjectKind::Mesh);
                } else if transform {
                    self.records.mark_transform_dirty(id, ObjectKind::Mesh);
                }
                match self.records.state(id) {
                    ObjectState::TransformDirty => {
                        ObjectAction::Transform(to_engine_matrix(matrix_world))
                    }
                    ObjectState::GeometryDirty | ObjectState::Unknown => ObjectAction::Rebuild,
                    ObjectState::Loaded => ObjectAction::Skip,
                }
            }
            Some(ObjectPayload::Light(light)) => ObjectAction::Sun(translate_light(light)),
            Some(ObjectPayload::Camera(_)) => ObjectAction::Camera,
            Some(ObjectPayload::Unsupported { kind }) => {
                tracing::warn!(id, kind = %kind, "unsupported object kind; skipped");
                ObjectAction::Skip
            }
        };

        match action {
            ObjectAction::Rebuild => {
                self.rebuild(engine, host);
                report.rebuilt = true;
            }
            ObjectAction::Transform(matrix) => {
                if let Err(e) = engine.set_mesh_transform_matrix(id, &matrix) {
                    tracing::warn!(id, error = %e, "set_mesh_transform_matrix failed");
                }
                self.records.mark_transform_applied(id, ObjectKind::Mesh);
                report.transforms += 1;
            }
            ObjectAction::Sun(light) => {
                if let Err(e) = engine.set_sun(&light) {
                    tracing::warn!(id, error = %e, "set_sun failed");
                }
                self.records.mark_transform_applied(id, ObjectKind::Light);
                report.object_updates += 1;
            }
            ObjectAction::Camera => {
                self.update_camera(engine, host);
                self.records.mark_transform_applied(id, ObjectKind::Camera);
                report.object_updates += 1;
            }
            ObjectAction::Skip => report.skipped += 1,
        }
    }

    /// Reload everything the engine holds from the host scene.
    ///
    /// Clears models once, then loads every visible instance in host order (meshes with their
    /// transform, lights as the sun, cameras), then textures and the cubemap, then refreshes the
    /// camera and force-pushes both shader stages.
    #[tracing::instrument(skip_all, fields(mode = ?self.mode))]
    pub fn rebuild(&mut self, engine: &mut dyn EngineHandle, host: &mut dyn HostScene) {
        if let Err(e) = engine.clear_models() {
            tracing::warn!(error = %e, "clear_models failed");
        }

        let settings = host.render_settings();
        let mut live = BTreeSet::new();
        let mut loaded = 0usize;
        for object in host.visible_instances() {
            let translated = match translate_object(object, &settings, &self.config.camera) {
                Ok(Some(t)) => t,
                Ok(None) => {
                    tracing::warn!(id = %object.id, "unsupported object kind; skipped");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(id = %object.id, error = %e, "translation failed; skipped");
                    continue;
                }
            };

            let id = object.id.as_str();
            let (kind, result) = match translated {
                TranslatedObject::Mesh { mesh, transform } => (
                    ObjectKind::Mesh,
                    engine
                        .load_mesh(id, mesh)
                        .and_then(|()| engine.set_mesh_transform_matrix(id, &transform)),
                ),
                TranslatedObject::Light(light) => (ObjectKind::Light, engine.set_sun(&light)),
                TranslatedObject::Camera(camera) => {
                    (ObjectKind::Camera, engine.set_camera(&camera))
                }
            };
            if let Err(e) = result {
                tracing::warn!(id, error = %e, "engine rejected object");
            }
            self.records.mark_loaded(id, kind);
            live.insert(object.id.clone());
            loaded += 1;
        }
        self.records.retain_live(&live);

        for image in host.images() {
            if let Err(e) = self.resources.ensure_texture(engine, image, self.mode) {
                tracing::warn!(image = %image.name, error = %e, "texture upload failed");
            }
        }
        if let Some(env) = host.environment() {
            if let Err(e) = self.resources.ensure_cubemap(engine, env) {
                tracing::warn!(image = %env.name, error = %e, "cubemap upload failed");
            }
        }

        self.update_camera(engine, host);
        self.shaders.tick(engine, host.texts(), true);
        tracing::info!(objects = loaded, "scene rebuilt");
    }

    /// Host timer callback: hot-reload edited shaders. Returns whether shaders were reloaded.
    #[tracing::instrument(skip_all)]
    pub fn tick(&mut self, engine: &mut dyn EngineHandle, host: &mut dyn HostScene) -> bool {
        let reloaded = self.shaders.tick(engine, host.texts(), false);
        if reloaded {
            host.request_redraw();
        }
        reloaded
    }

    /// Push the camera for the current mode.
    ///
    /// Preview follows the interactive viewport (resizing the engine when it changes size) and
    /// falls back to the active scene camera; final renders use the scene camera only.
    pub fn update_camera(&mut self, engine: &mut dyn EngineHandle, host: &dyn HostScene) {
        let viewport = match self.mode {
            ExecutionMode::Preview => host.viewport(),
            ExecutionMode::Final => None,
        };

        let state = match viewport {
            Some(vp) => {
                if self.viewport_size != Some((vp.width, vp.height)) {
                    if let Err(e) = engine.resize(vp.width, vp.height) {
                        tracing::warn!(error = %e, "resize failed");
                    }
                    self.viewport_size = Some((vp.width, vp.height));
                }
                match viewport_camera(&vp, &self.config.camera) {
                    Ok(state) => state,
                    Err(e) => {
                        tracing::warn!(error = %e, "viewport camera skipped");
                        return;
                    }
                }
            }
            None => match host.active_camera() {
                Some(cam) => scene_camera(cam, &host.render_settings(), &self.config.camera),
                None => {
                    tracing::debug!("no camera to push");
                    return;
                }
            },
        };
        if let Err(e) = engine.set_camera(&state) {
            tracing::warn!(error = %e, "set_camera failed");
        }
    }

    /// Render one frame at the host's current frame.
    pub fn draw(
        &mut self,
        engine: &mut dyn EngineHandle,
        host: &dyn HostScene,
    ) -> BridgeResult<()> {
        engine.set_frame(host.current_frame())?;
        self.update_camera(engine, host);
        engine.draw()
    }

    /// Forget everything pushed so far; the next [`SceneSynchronizer::start`] reloads it all.
    pub fn reset(&mut self) {
        self.records.clear();
        self.resources.clear();
        self.shaders.invalidate();
        self.viewport_size = None;
    }

    /// Offline render of the current frame to `output`.
    ///
    /// The preview engine is closed, a dedicated engine renders the scene from the active scene
    /// camera at the output resolution with pixel-copied textures, then the preview is recreated
    /// and reloaded from scratch.
    pub fn render_final(
        &mut self,
        ctx: &mut EngineContext,
        host: &mut dyn HostScene,
        output: &Path,
    ) -> BridgeResult<()> {
        let mut pass =
            SceneSynchronizer::new(self.config.clone())?.with_mode(ExecutionMode::Final);
        ctx.render_final(|engine| {
            let size = host.render_settings().output_size();
            engine.resize(size.width, size.height)?;
            pass.start(engine, host)?;
            engine.set_output(output)?;
            pass.draw(engine, host)?;
            tracing::info!(output = %output.display(), "final frame rendered");
            Ok(())
        })?;

        self.reset();
        if let Some(preview) = ctx.preview_mut() {
            self.start(preview, host)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sync/synchronizer.rs"]
mod tests;
