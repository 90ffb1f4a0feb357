use super::*;

#[cfg(unix)]
const FAKE_VIEWER: &str = r#"
while IFS= read -r line; do
  case "$line" in
    exit) exit 0 ;;
    time) echo 12.5 ;;
    delta) echo 0.016 ;;
    fps) echo fast ;;
    *) echo "$line" ;;
  esac
done
"#;

#[cfg(unix)]
fn fake_viewer() -> ControlChannel {
    ControlChannel::new(vec!["sh".into(), "-c".into(), FAKE_VIEWER.into()])
        .unwrap()
        .with_timing(ChannelTiming {
            settle: Duration::from_millis(150),
            stop_poll: Duration::from_millis(10),
        })
}

#[test]
fn empty_argv_is_rejected() {
    assert!(ControlChannel::new(Vec::new()).is_err());
    assert!(ControlChannel::new(vec![String::new()]).is_err());
}

#[test]
fn unstarted_channel_reports_closed() {
    let mut ch = ControlChannel::new(vec!["glslViewer".into(), "a.frag".into()]).unwrap();
    assert!(!ch.is_running());
    assert_eq!(ch.read(), Reply::Closed);
    assert_eq!(ch.write("time"), Reply::Closed);
    assert_eq!(ch.time(), None);
    assert!(!ch.stop());
    assert_eq!(ch.command_line(), "glslViewer a.frag");
}

#[test]
fn spawn_failure_is_an_error_and_leaves_channel_stopped() {
    let mut ch = ControlChannel::new(vec!["gvbridge-no-such-binary-xyz".into()]).unwrap();
    assert!(ch.start().is_err());
    assert!(!ch.is_running());
}

#[cfg(unix)]
#[test]
fn read_on_empty_pipe_returns_none_sentinel() {
    let mut ch = fake_viewer();
    assert!(ch.start().unwrap());
    assert_eq!(ch.read(), Reply::Empty);
    assert_eq!(ch.read(), Reply::Empty);
    assert!(ch.stop());
}

#[cfg(unix)]
#[test]
fn second_start_is_a_no_op() {
    let mut ch = fake_viewer();
    assert!(ch.start().unwrap());
    assert!(!ch.start().unwrap());
    assert!(ch.is_running());
    assert!(ch.stop());
}

#[cfg(unix)]
#[test]
fn numeric_queries_keep_last_good_value() {
    let mut ch = fake_viewer();
    ch.start().unwrap();

    assert_eq!(ch.time(), Some(12.5));
    assert_eq!(ch.delta(), Some(0.016));
    // "fast" is not a number: the cached fps (initially zero) survives.
    assert_eq!(ch.fps(), Some(0.0));

    assert!(ch.stop());
    assert!(!ch.is_running());
    assert_eq!(ch.update(), Reply::Closed);
}

#[cfg(unix)]
#[test]
fn commands_are_echoed_by_the_fake_viewer() {
    let mut ch = fake_viewer();
    ch.start().unwrap();
    assert_eq!(
        ch.set_uniform("u_mix", &[0.25, 1.0]),
        Reply::Text("u_mix,0.25,1".into())
    );
    assert_eq!(
        ch.set_camera_position(1.0, 2.0, 3.0),
        Reply::Text("camera_position,1,2,3".into())
    );
    ch.stop();
}

#[cfg(unix)]
#[test]
fn broken_pipe_marks_channel_not_running() {
    let mut ch = ControlChannel::new(vec!["sh".into(), "-c".into(), "exit 0".into()])
        .unwrap()
        .with_timing(ChannelTiming {
            settle: Duration::from_millis(1),
            stop_poll: Duration::from_millis(10),
        });
    ch.start().unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while !ch.is_finished() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(ch.is_finished());

    assert_eq!(ch.write("update"), Reply::Closed);
    assert!(!ch.is_running());
    assert_eq!(ch.write("update"), Reply::Closed);
}

#[cfg(unix)]
#[test]
fn sample_loop_stops_when_viewer_exits() {
    let mut ch = ControlChannel::new(vec!["sh".into(), "-c".into(), "exit 0".into()])
        .unwrap()
        .with_timing(ChannelTiming {
            settle: Duration::from_millis(1),
            stop_poll: Duration::from_millis(10),
        });
    let started = Instant::now();
    let samples = ch
        .sample_loop(Duration::from_secs(30), Duration::ZERO)
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(30));
    assert!(samples.iter().all(|s| s.fps == 0.0));
}
