use super::*;
use crate::channel::process::ChannelTiming;
use std::time::Duration;

#[cfg(unix)]
const LOGGING_VIEWER: &str = r#"
while IFS= read -r line; do
  printf '%s\n' "$line" >> "$0"
  [ "$line" = exit ] && exit 0
done
"#;

#[cfg(unix)]
fn logging_engine(dir: &Path) -> (RemoteEngine, PathBuf) {
    let log = dir.join("wire.log");
    let mut channel = ControlChannel::new(vec![
        "sh".into(),
        "-c".into(),
        LOGGING_VIEWER.into(),
        log.display().to_string(),
    ])
    .unwrap()
    .with_timing(ChannelTiming {
        settle: Duration::from_millis(1),
        stop_poll: Duration::from_millis(10),
    });
    channel.start().unwrap();

    let mut files = BTreeMap::new();
    files.insert(ShaderStage::Fragment, dir.join("main.frag"));
    (RemoteEngine::new(channel, files), log)
}

#[cfg(unix)]
#[test]
fn engine_calls_become_console_commands() {
    let dir = tempfile::tempdir().unwrap();
    let (mut engine, log) = logging_engine(dir.path());

    engine.clear_models().unwrap();
    engine
        .set_sun(&LightState {
            position: [1.0, -2.0, 3.0],
        })
        .unwrap();
    engine.set_sky_ground(Rgb::new(0.5, 0.25, 1.0)).unwrap();
    engine.set_sky_turbidity(4.0).unwrap();
    engine.show_passes(true).unwrap();
    engine.show_histogram(false).unwrap();
    engine.enable_cubemap(true).unwrap();
    engine.load_shaders().unwrap();
    engine.set_output(Path::new("out.png")).unwrap();
    engine.draw().unwrap();
    engine.close().unwrap();
    assert!(!engine.channel().is_running());

    let wire = std::fs::read_to_string(log).unwrap();
    let lines: Vec<&str> = wire.lines().collect();
    assert_eq!(
        lines,
        [
            "models,clear",
            "light_position,1,-2,3",
            "skybox_ground,0.5,0.25,1",
            "sky_turbidity,4",
            "buffers,show",
            "plot,off",
            "cubemap,on",
            "reload",
            "screenshot,out.png",
            "exit",
        ]
    );
}

#[cfg(unix)]
#[test]
fn set_source_writes_the_bound_shader_file() {
    let dir = tempfile::tempdir().unwrap();
    let (mut engine, _log) = logging_engine(dir.path());

    engine
        .set_source(ShaderStage::Fragment, "void main() {}")
        .unwrap();
    assert_eq!(
        std::fs::read_to_string(dir.path().join("main.frag")).unwrap(),
        "void main() {}"
    );
    assert!(matches!(
        engine.set_source(ShaderStage::Vertex, "void main() {}"),
        Err(BridgeError::Engine(_))
    ));
    engine.close().unwrap();
}

#[test]
fn commands_fail_once_the_viewer_is_gone() {
    let channel = ControlChannel::new(vec!["glslViewer".into(), "a.frag".into()]).unwrap();
    let mut engine = RemoteEngine::new(channel, BTreeMap::new());
    assert!(engine.clear_models().is_err());
    assert!(engine.load_shaders().is_err());
    // Operations without a console command still succeed.
    assert!(engine.resize(10, 10).is_ok());
    assert!(engine.close().is_ok());
}

#[test]
fn texture_names_are_tracked_locally() {
    let channel = ControlChannel::new(vec!["glslViewer".into(), "a.frag".into()]).unwrap();
    let mut engine = RemoteEngine::new(channel, BTreeMap::new());
    let pixels = [0.0f32; 4];
    engine
        .add_texture(&TextureUpload {
            name: "wood",
            width: 1,
            height: 1,
            channels: 4,
            source: crate::engine::handle::TextureSource::Pixels(&pixels),
        })
        .unwrap();
    assert!(engine.have_texture("wood"));
    assert!(!engine.have_cubemap("wood"));
}

#[cfg(unix)]
#[test]
fn launch_binds_shader_files_from_options() {
    let dir = tempfile::tempdir().unwrap();
    let frag = dir.path().join("main.frag");
    let opts = ViewerOptions {
        program: Some("true".into()),
        ..ViewerOptions::new(&frag)
    };

    let mut engine = RemoteEngine::launch(&opts).unwrap();
    assert_eq!(
        engine.channel().command_line(),
        format!("true {}", frag.display())
    );

    engine
        .set_source(ShaderStage::Fragment, "void main() {}\n")
        .unwrap();
    assert_eq!(std::fs::read_to_string(&frag).unwrap(), "void main() {}\n");
    assert!(engine.set_source(ShaderStage::Vertex, "").is_err());
    engine.close().unwrap();
}
