use super::*;
use crate::engine::recording::{EngineCall, RecordingEngine};
use crate::foundation::core::{HOST_IDENTITY, Rgb};
use crate::host::{
    CameraIntrinsics, Corner, HostCamera, HostImage, HostLight, HostMesh, MemoryScene,
    SceneObject, TextStore, ViewportCamera,
};
use crate::translate::camera::{SCENE_CAMERA_SCALE, VIEWPORT_CAMERA_SCALE};

fn mesh(id: &str, x: f32) -> SceneObject {
    let mut matrix_world = HOST_IDENTITY;
    matrix_world[0][3] = x;
    let up = [0.0, 0.0, 1.0];
    SceneObject {
        id: id.into(),
        payload: ObjectPayload::Mesh {
            data: HostMesh {
                points: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
                point_normals: vec![up; 3],
                custom_normals: None,
                corners: (0..3).map(|point| Corner { point, normal: up }).collect(),
                triangles: vec![[0, 1, 2]],
                corner_colors: None,
                corner_uvs: None,
            },
            matrix_world,
        },
    }
}

fn sun(x: f32) -> SceneObject {
    let mut matrix_world = HOST_IDENTITY;
    matrix_world[0][3] = x;
    SceneObject {
        id: "Sun".into(),
        payload: ObjectPayload::Light(HostLight { matrix_world }),
    }
}

fn scene() -> MemoryScene {
    let mut scene = MemoryScene::new();
    scene.upsert(mesh("A", 1.0));
    scene.upsert(mesh("B", 2.0));
    scene
}

fn started(scene: &mut MemoryScene) -> (SceneSynchronizer, RecordingEngine) {
    let mut sync = SceneSynchronizer::new(SyncConfig {
        shader_dir: "/nonexistent-gvbridge-shaders".into(),
        ..SyncConfig::default()
    })
    .unwrap();
    let mut engine = RecordingEngine::new();
    sync.start(&mut engine, scene).unwrap();
    engine.take_calls();
    (sync, engine)
}

fn loaded_meshes(engine: &RecordingEngine) -> Vec<String> {
    engine
        .calls()
        .iter()
        .filter_map(|c| match c {
            EngineCall::LoadMesh { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn start_pushes_config_defaults_scene_and_shaders() {
    let mut scene = scene();
    let mut sync = SceneSynchronizer::new(SyncConfig {
        shader_dir: "/nonexistent-gvbridge-shaders".into(),
        ..SyncConfig::default()
    })
    .unwrap();
    let mut engine = RecordingEngine::new();
    sync.start(&mut engine, &mut scene).unwrap();

    let ops = engine.ops();
    let clear = ops.iter().position(|op| *op == "clear_models").unwrap();
    let first_load = ops.iter().position(|op| *op == "load_mesh").unwrap();
    assert!(clear < first_load);
    assert_eq!(ops[0], "set_fxaa");
    assert_eq!(loaded_meshes(&engine), ["A", "B"]);
    assert_eq!(engine.count("set_source"), 2);
    assert_eq!(engine.count("load_shaders"), 1);
    assert_eq!(scene.redraw_count(), 1);

    assert_eq!(
        scene.texts.contents("main.vert").as_deref(),
        Some(crate::sync::shaders::DEFAULT_VERTEX_SHADER)
    );
    assert_eq!(sync.records().state("A"), ObjectState::Loaded);
}

#[test]
fn transform_only_change_skips_geometry() {
    let mut scene = scene();
    let (mut sync, mut engine) = started(&mut scene);

    scene.upsert(mesh("A", 5.0));
    let report = sync.apply_events(
        &mut engine,
        &mut scene,
        &[ChangeEvent::object("A", false, true)],
    );

    assert_eq!(report.transforms, 1);
    assert!(!report.rebuilt);
    assert_eq!(engine.ops(), ["set_mesh_transform_matrix"]);
    let EngineCall::SetMeshTransform { name, matrix } = &engine.calls()[0] else {
        panic!("unexpected call");
    };
    assert_eq!(name, "A");
    assert_eq!(matrix[12], -5.0);
    assert_eq!(sync.records().get("A").unwrap().transform_version, 2);
}

#[test]
fn geometry_change_rebuilds_with_a_single_clear_first() {
    let mut scene = scene();
    let (mut sync, mut engine) = started(&mut scene);

    let report = sync.apply_events(
        &mut engine,
        &mut scene,
        &[
            ChangeEvent::object("B", true, false),
            ChangeEvent::object("A", true, true),
        ],
    );

    assert!(report.rebuilt);
    assert_eq!(report.skipped, 1);
    assert_eq!(engine.count("clear_models"), 1);
    assert_eq!(engine.ops()[0], "clear_models");
    assert_eq!(loaded_meshes(&engine), ["A", "B"]);
    assert_eq!(scene.redraw_count(), 2);
}

#[test]
fn unknown_mesh_triggers_rebuild() {
    let mut scene = scene();
    let (mut sync, mut engine) = started(&mut scene);
    scene.upsert(mesh("C", 0.0));

    let report = sync.apply_events(
        &mut engine,
        &mut scene,
        &[ChangeEvent::object("C", false, true)],
    );
    assert!(report.rebuilt);
    assert_eq!(loaded_meshes(&engine), ["A", "B", "C"]);
}

#[test]
fn collection_change_drops_vanished_objects() {
    let mut scene = scene();
    let (mut sync, mut engine) = started(&mut scene);
    scene.remove("B");

    sync.apply_events(
        &mut engine,
        &mut scene,
        &[ChangeEvent::Collection {
            name: "Scene".into(),
        }],
    );
    assert_eq!(loaded_meshes(&engine), ["A"]);
    assert!(sync.records().get("B").is_none());
    assert_eq!(sync.records().len(), 1);
}

#[test]
fn world_change_updates_sky_without_rebuild() {
    let mut scene = scene();
    let (mut sync, mut engine) = started(&mut scene);

    let report = sync.apply_events(
        &mut engine,
        &mut scene,
        &[ChangeEvent::World {
            sky_ground: Rgb::new(0.1, 0.2, 0.3),
            turbidity: 5.0,
        }],
    );
    assert_eq!(report.world_updates, 1);
    assert_eq!(
        engine.calls(),
        [
            EngineCall::SetSkyGround(Rgb::new(0.1, 0.2, 0.3)),
            EngineCall::SetSkyTurbidity(5.0),
        ]
    );
}

#[test]
fn light_change_moves_the_sun_and_last_write_wins() {
    let mut scene = scene();
    scene.upsert(sun(1.0));
    let (mut sync, mut engine) = started(&mut scene);

    scene.upsert(sun(7.0));
    sync.apply_events(
        &mut engine,
        &mut scene,
        &[
            ChangeEvent::object("Sun", false, true),
            ChangeEvent::object("Sun", false, true),
        ],
    );
    assert_eq!(engine.count("set_sun"), 2);
    assert_eq!(
        engine.calls().last(),
        Some(&EngineCall::SetSun(crate::translate::light::LightState {
            position: [-7.0, -0.0, -0.0]
        }))
    );
    assert_eq!(scene.redraw_count(), 2);
}

#[test]
fn unsupported_and_unknown_objects_are_skipped_without_redraw() {
    let mut scene = scene();
    scene.upsert(SceneObject {
        id: "Curve".into(),
        payload: ObjectPayload::Unsupported {
            kind: "CURVE".into(),
        },
    });
    let (mut sync, mut engine) = started(&mut scene);
    let redraws = scene.redraw_count();

    let report = sync.apply_events(
        &mut engine,
        &mut scene,
        &[
            ChangeEvent::object("Curve", true, true),
            ChangeEvent::object("Ghost", true, false),
            ChangeEvent::Other {
                name: "Material".into(),
            },
        ],
    );
    assert_eq!(report.skipped, 3);
    assert!(!report.redraw);
    assert!(engine.calls().is_empty());
    assert_eq!(scene.redraw_count(), redraws);
}

#[test]
fn engine_failures_are_logged_and_rebuild_continues() {
    let mut scene = scene();
    scene.upsert(sun(1.0));
    let mut sync = SceneSynchronizer::new(SyncConfig::default()).unwrap();
    let mut engine = RecordingEngine::new().fail_on("load_mesh");

    sync.rebuild(&mut engine, &mut scene);
    assert_eq!(engine.count("load_mesh"), 0);
    assert_eq!(engine.count("set_sun"), 1);
    // Failed objects are not retried on the next event.
    assert_eq!(sync.records().state("A"), ObjectState::Loaded);
}

#[test]
fn image_events_upload_each_texture_once() {
    let mut scene = scene();
    scene.images.push(HostImage {
        name: "wood.png".into(),
        width: 1,
        height: 1,
        channels: 4,
        pixels: vec![1.0; 4],
        gpu_handle: Some(9),
    });
    let mut sync = SceneSynchronizer::new(SyncConfig::default()).unwrap();
    let mut engine = RecordingEngine::new();

    let event = ChangeEvent::Image {
        name: "wood.png".into(),
    };
    let first = sync.apply_events(&mut engine, &mut scene, std::slice::from_ref(&event));
    let second = sync.apply_events(&mut engine, &mut scene, std::slice::from_ref(&event));
    assert_eq!((first.uploads, second.uploads), (1, 0));
    assert!(first.redraw && !second.redraw);
    assert_eq!(engine.count("add_texture"), 1);
    assert!(sync.resources().texture("wood_png").is_some());
}

#[test]
fn tick_reloads_edited_shaders_and_requests_redraw() {
    let mut scene = scene();
    let (mut sync, mut engine) = started(&mut scene);
    let redraws = scene.redraw_count();

    assert!(!sync.tick(&mut engine, &mut scene));
    scene.texts.edit("main.frag", "void main() {}").unwrap();
    assert!(sync.tick(&mut engine, &mut scene));
    assert_eq!(engine.ops(), ["set_source", "load_shaders"]);
    assert_eq!(scene.redraw_count(), redraws + 1);
}

#[test]
fn preview_camera_follows_viewport_and_resizes_once() {
    let mut scene = scene();
    scene.viewport = Some(ViewportCamera {
        view_matrix: HOST_IDENTITY,
        projection_matrix: HOST_IDENTITY,
        width: 640,
        height: 480,
    });
    let mut sync = SceneSynchronizer::new(SyncConfig::default()).unwrap();
    let mut engine = RecordingEngine::new();

    sync.update_camera(&mut engine, &scene);
    sync.update_camera(&mut engine, &scene);
    assert_eq!(engine.count("resize"), 1);
    assert_eq!(engine.count("set_camera"), 2);
    let Some(EngineCall::SetCamera(state)) = engine.calls().last() else {
        panic!("expected set_camera");
    };
    assert_eq!(state.scale, VIEWPORT_CAMERA_SCALE);
}

#[test]
fn final_mode_uses_scene_camera_intrinsics() {
    let mut scene = scene();
    scene.viewport = Some(ViewportCamera {
        view_matrix: HOST_IDENTITY,
        projection_matrix: HOST_IDENTITY,
        width: 640,
        height: 480,
    });
    scene.camera = Some(HostCamera {
        matrix_world: HOST_IDENTITY,
        intrinsics: CameraIntrinsics::default(),
    });
    let mut sync = SceneSynchronizer::new(SyncConfig::default())
        .unwrap()
        .with_mode(ExecutionMode::Final);
    let mut engine = RecordingEngine::new();

    sync.update_camera(&mut engine, &scene);
    assert_eq!(engine.count("resize"), 0);
    let [EngineCall::SetCamera(state)] = engine.calls() else {
        panic!("expected a single set_camera");
    };
    assert_eq!(state.scale, SCENE_CAMERA_SCALE);
    assert!(state.clip.is_some());
}

#[test]
fn draw_sets_frame_then_renders() {
    let mut scene = scene();
    scene.frame = 42;
    let mut sync = SceneSynchronizer::new(SyncConfig::default()).unwrap();
    let mut engine = RecordingEngine::new();
    sync.draw(&mut engine, &scene).unwrap();
    assert_eq!(engine.calls().first(), Some(&EngineCall::SetFrame(42)));
    assert_eq!(engine.calls().last(), Some(&EngineCall::Draw));
}

#[test]
fn reset_forgets_records_and_cache() {
    let mut scene = scene();
    let (mut sync, _engine) = started(&mut scene);
    assert!(!sync.records().is_empty());
    sync.reset();
    assert!(sync.records().is_empty());
    assert!(
        sync.shaders()
            .state(crate::foundation::core::ShaderStage::Fragment)
            .unwrap()
            .cached_text
            .is_none()
    );
}
