use std::collections::BTreeMap;
use std::io::{Read as _, Write as _};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command as Process, Stdio};
use std::time::{Duration, Instant};

use crate::channel::options::{UniformValue, ViewerOptions};
use crate::channel::protocol::{Command, Reply};
use crate::foundation::core::ShaderStage;
use crate::foundation::error::{BridgeError, BridgeResult};

/// Bytes read from the viewer's stdout per `read()`.
pub const READ_CHUNK_BYTES: usize = 1024;

/// Sleep/poll intervals used by [`ControlChannel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelTiming {
    /// Pause between writing a command and reading its reply.
    pub settle: Duration,
    /// Poll interval while waiting for the process to exit in `stop()`.
    pub stop_poll: Duration,
}

impl Default for ChannelTiming {
    fn default() -> Self {
        Self {
            settle: Duration::from_micros(100),
            stop_poll: Duration::from_secs(1),
        }
    }
}

/// One `sample_loop` measurement.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Sample {
    /// Seconds since the loop started.
    pub time: f64,
    /// Last known seconds-per-frame reported by the viewer.
    pub delta: f64,
    /// Last known frames-per-second reported by the viewer.
    pub fps: f64,
}

struct Running {
    child: Child,
    stdin: ChildStdin,
    stdout: ChildStdout,
}

/// Line-protocol driver for a long-lived glslViewer process.
///
/// All I/O happens synchronously on the calling thread. Replies are read once, right after a
/// short settle sleep, so they are best-effort: a slow viewer yields [`Reply::Empty`] or a reply
/// to an earlier command. Once the process exits or the pipe breaks, every call answers
/// [`Reply::Closed`] (or `false`/`None`) instead of failing.
pub struct ControlChannel {
    argv: Vec<String>,
    startup_uniforms: BTreeMap<String, UniformValue>,
    timing: ChannelTiming,
    process: Option<Running>,

    elapsed_time: f64,
    delta: f64,
    fps: f64,
}

impl ControlChannel {
    /// Channel for an explicit argv (program first).
    pub fn new(argv: Vec<String>) -> BridgeResult<Self> {
        if argv.first().is_none_or(|p| p.is_empty()) {
            return Err(BridgeError::validation(
                "control channel needs a program to run",
            ));
        }
        Ok(Self {
            argv,
            startup_uniforms: BTreeMap::new(),
            timing: ChannelTiming::default(),
            process: None,
            elapsed_time: 0.0,
            delta: 0.0,
            fps: 0.0,
        })
    }

    /// Channel for a glslViewer launched with `opts`; its uniforms are pushed on start.
    pub fn from_options(opts: &ViewerOptions) -> BridgeResult<Self> {
        opts.validate()?;
        let mut channel = Self::new(opts.to_argv())?;
        channel.startup_uniforms = opts.uniforms.clone();
        Ok(channel)
    }

    /// Override the settle/poll intervals.
    pub fn with_timing(mut self, timing: ChannelTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Current intervals.
    pub fn timing(&self) -> ChannelTiming {
        self.timing
    }

    /// The argv joined with spaces, for display.
    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }

    /// Spawn the process.
    ///
    /// Returns `Ok(false)` without touching anything when a process is already running.
    pub fn start(&mut self) -> BridgeResult<bool> {
        if self.is_running() {
            return Ok(false);
        }

        let mut cmd = Process::new(&self.argv[0]);
        cmd.args(&self.argv[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        let mut child = cmd.spawn().map_err(|e| {
            BridgeError::channel(format!("failed to spawn '{}': {e}", self.argv[0]))
        })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(BridgeError::channel(
                "failed to open viewer stdio pipes (unexpected)",
            ));
        };

        if let Err(e) = set_nonblocking(&stdout) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(BridgeError::channel(format!(
                "failed to make viewer stdout non-blocking: {e}"
            )));
        }

        tracing::info!(command = %self.command_line(), pid = child.id(), "viewer started");
        self.process = Some(Running {
            child,
            stdin,
            stdout,
        });

        let uniforms = std::mem::take(&mut self.startup_uniforms);
        self.set_uniforms(&uniforms);
        self.startup_uniforms = uniforms;
        Ok(true)
    }

    /// Send `exit` and wait for the process to terminate.
    ///
    /// There is no timeout: a viewer that ignores `exit` blocks this call forever.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }

        self.write("exit");
        while self.is_running() && !self.is_finished() {
            std::thread::sleep(self.timing.stop_poll);
        }
        if let Some(mut running) = self.process.take() {
            let _ = running.child.wait();
        }
        tracing::info!("viewer stopped");
        true
    }

    /// `true` between a successful `start()` and `stop()`/a broken pipe.
    pub fn is_running(&self) -> bool {
        self.process.is_some()
    }

    /// `true` when the running process has exited.
    pub fn is_finished(&mut self) -> bool {
        match self.process.as_mut() {
            None => false,
            Some(running) => !matches!(running.child.try_wait(), Ok(None)),
        }
    }

    /// One non-blocking read of up to [`READ_CHUNK_BYTES`].
    pub fn read(&mut self) -> Reply {
        let Some(running) = self.process.as_mut() else {
            return Reply::Closed;
        };
        let mut buf = [0u8; READ_CHUNK_BYTES];
        match running.stdout.read(&mut buf) {
            Ok(n) => Reply::from_bytes(&buf[..n]),
            // WouldBlock and friends: nothing to read right now.
            Err(_) => Reply::Empty,
        }
    }

    /// Write one command line, wait the settle interval and read once.
    pub fn write(&mut self, line: &str) -> Reply {
        let Some(running) = self.process.as_mut() else {
            return Reply::Closed;
        };

        tracing::debug!(line, "viewer <-");
        let sent = running
            .stdin
            .write_all(line.as_bytes())
            .and_then(|()| running.stdin.write_all(b"\n"))
            .and_then(|()| running.stdin.flush());
        if let Err(e) = sent {
            tracing::warn!(error = %e, "viewer pipe closed; marking channel as not running");
            if let Some(mut running) = self.process.take() {
                let _ = running.child.try_wait();
            }
            return Reply::Closed;
        }

        std::thread::sleep(self.timing.settle);
        let reply = self.read();
        tracing::debug!(?reply, "viewer ->");
        reply
    }

    /// Send a typed command.
    pub fn send(&mut self, cmd: &Command) -> Reply {
        self.write(&cmd.to_line())
    }

    /// Set one uniform.
    pub fn set_uniform(&mut self, name: &str, values: &[f32]) -> Reply {
        self.send(&Command::uniform(name, values))
    }

    /// Set several uniforms in name order.
    pub fn set_uniforms(&mut self, uniforms: &BTreeMap<String, UniformValue>) -> bool {
        if !self.is_running() {
            return false;
        }
        for (name, value) in uniforms {
            self.set_uniform(name, &value.components());
        }
        true
    }

    /// Current fragment shader source as reported by the viewer.
    pub fn fragment_source(&mut self) -> Reply {
        self.send(&Command::Source(ShaderStage::Fragment))
    }

    /// Current vertex shader source as reported by the viewer.
    pub fn vertex_source(&mut self) -> Reply {
        self.send(&Command::Source(ShaderStage::Vertex))
    }

    /// Elapsed seconds; malformed replies keep the previous value.
    pub fn time(&mut self) -> Option<f64> {
        let reply = self.send(&Command::Time);
        reply.is_open().then(|| {
            if let Some(v) = reply.numeric() {
                self.elapsed_time = v;
            }
            self.elapsed_time
        })
    }

    /// Seconds between frames; malformed replies keep the previous value.
    pub fn delta(&mut self) -> Option<f64> {
        let reply = self.send(&Command::Delta);
        reply.is_open().then(|| {
            if let Some(v) = reply.numeric() {
                self.delta = v;
            }
            self.delta
        })
    }

    /// Frames per second; malformed replies keep the previous value.
    pub fn fps(&mut self) -> Option<f64> {
        let reply = self.send(&Command::Fps);
        reply.is_open().then(|| {
            if let Some(v) = reply.numeric() {
                self.fps = v;
            }
            self.fps
        })
    }

    /// Delay the viewer's command processing.
    pub fn wait(&mut self, secs: f64) -> Reply {
        self.send(&Command::Wait(secs))
    }

    /// Force a uniform update.
    pub fn update(&mut self) -> Reply {
        self.send(&Command::Update)
    }

    /// Reload one file, or everything when `filename` is `None`.
    pub fn reload(&mut self, filename: Option<&str>) -> Reply {
        self.send(&Command::Reload(filename.map(str::to_string)))
    }

    /// Save a screenshot.
    pub fn screenshot(&mut self, path: &Path) -> Reply {
        self.send(&Command::Screenshot(path.to_path_buf()))
    }

    /// Save a PNG sequence between two timestamps.
    pub fn sequence(&mut self, start_sec: f64, end_sec: f64) -> Reply {
        self.send(&Command::Sequence {
            start: start_sec,
            end: end_sec,
        })
    }

    /// Move the viewer camera.
    pub fn set_camera_position(&mut self, x: f32, y: f32, z: f32) -> Reply {
        self.send(&Command::CameraPosition([x, y, z]))
    }

    /// Tight, non-yielding timing loop for benchmarks.
    ///
    /// Starts the viewer if needed. Once `record_from` has elapsed, samples `delta`/`fps` on
    /// every iteration until `duration` elapses or the viewer goes away. Burns a core while it
    /// runs; not meant for production drive loops.
    pub fn sample_loop(
        &mut self,
        duration: Duration,
        record_from: Duration,
    ) -> BridgeResult<Vec<Sample>> {
        if !self.is_running() {
            self.start()?;
        }

        let mut samples = Vec::new();
        let started = Instant::now();
        loop {
            let elapsed = started.elapsed();
            if elapsed < record_from {
                std::hint::spin_loop();
                continue;
            }
            if elapsed >= duration || !self.is_running() || self.is_finished() {
                break;
            }
            let delta = self.delta().unwrap_or(self.delta);
            let fps = self.fps().unwrap_or(self.fps);
            samples.push(Sample {
                time: elapsed.as_secs_f64(),
                delta,
                fps,
            });
        }
        Ok(samples)
    }
}

impl Drop for ControlChannel {
    fn drop(&mut self) {
        if let Some(mut running) = self.process.take() {
            tracing::debug!("dropping running viewer; killing process");
            let _ = running.child.kill();
            let _ = running.child.wait();
        }
    }
}

#[cfg(unix)]
fn set_nonblocking(stdout: &ChildStdout) -> std::io::Result<()> {
    use rustix::fs::{OFlags, fcntl_getfl, fcntl_setfl};

    let flags = fcntl_getfl(stdout)?;
    fcntl_setfl(stdout, flags | OFlags::NONBLOCK)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_nonblocking(_stdout: &ChildStdout) -> std::io::Result<()> {
    Err(std::io::Error::other(
        "non-blocking viewer pipes are only supported on unix hosts",
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/channel/process.rs"]
mod tests;
