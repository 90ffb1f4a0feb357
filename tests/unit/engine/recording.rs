use super::*;
use crate::engine::handle::TextureSource;

#[test]
fn records_calls_in_order() {
    let mut engine = RecordingEngine::new();
    engine.clear_models().unwrap();
    engine.set_sky_turbidity(4.0).unwrap();
    engine.draw().unwrap();
    assert_eq!(engine.ops(), ["clear_models", "set_sky_turbidity", "draw"]);
    assert_eq!(engine.count("draw"), 1);
    assert_eq!(engine.take_calls().len(), 3);
    assert!(engine.calls().is_empty());
}

#[test]
fn tracks_uploaded_textures_and_cubemaps() {
    let mut engine = RecordingEngine::new();
    assert!(!engine.have_texture("wood"));
    engine
        .add_texture(&TextureUpload {
            name: "wood",
            width: 1,
            height: 1,
            channels: 4,
            source: TextureSource::GpuHandle(7),
        })
        .unwrap();
    assert!(engine.have_texture("wood"));
    assert_eq!(
        engine.calls()[0],
        EngineCall::AddTexture {
            name: "wood".into(),
            width: 1,
            height: 1,
            channels: 4,
            upload: UploadKind::GpuHandleRef,
        }
    );

    engine.add_cubemap("sky", 2, 1, 3, &[0.0; 6]).unwrap();
    assert!(engine.have_cubemap("sky"));
    assert!(!engine.have_texture("sky"));
}

#[test]
fn injected_failures_are_not_recorded() {
    let mut engine = RecordingEngine::new().fail_on("load_shaders");
    assert!(engine.load_shaders().is_err());
    assert!(engine.calls().is_empty());
    engine.draw().unwrap();
    assert_eq!(engine.ops(), ["draw"]);
}

#[test]
fn closed_engine_rejects_calls() {
    let mut engine = RecordingEngine::new();
    engine.close().unwrap();
    assert!(engine.is_closed());
    assert!(matches!(engine.draw(), Err(BridgeError::Engine(_))));
    assert_eq!(engine.ops(), ["close"]);
}

#[test]
fn shared_journal_tags_entries_by_engine() {
    let log = CallLog::new();
    let mut a = RecordingEngine::with_journal("preview", log.clone());
    let mut b = RecordingEngine::with_journal("final", log.clone());
    a.close().unwrap();
    b.draw().unwrap();
    assert_eq!(log.ops(), ["preview:close", "final:draw"]);
    assert_eq!(log.entries().len(), 2);
}
