//! glslViewer console protocol: newline-terminated ASCII commands and their replies.

use smallvec::SmallVec;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::foundation::core::ShaderStage;

/// Literal reply glslViewer (and a drained pipe) uses for "no value".
pub const NONE_SENTINEL: &str = "none";

/// Boolean console switch, rendered as the word the viewer expects for that command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    /// `on` / `show` / `luma`.
    On,
    /// `off` / `hide`.
    Off,
}

impl From<bool> for Toggle {
    fn from(value: bool) -> Self {
        if value { Toggle::On } else { Toggle::Off }
    }
}

impl Toggle {
    fn on_off(self) -> &'static str {
        match self {
            Toggle::On => "on",
            Toggle::Off => "off",
        }
    }

    fn show_hide(self) -> &'static str {
        match self {
            Toggle::On => "show",
            Toggle::Off => "hide",
        }
    }
}

/// One request line of the control protocol.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Close the viewer.
    Exit,
    /// Query elapsed seconds.
    Time,
    /// Query seconds between frames.
    Delta,
    /// Query frames per second.
    Fps,
    /// Query a shader stage's source.
    Source(ShaderStage),
    /// Set a uniform (`name,v0,v1,...`). An empty value list queries it.
    Uniform {
        /// Uniform name.
        name: String,
        /// Uniform components.
        values: SmallVec<[f32; 4]>,
    },
    /// Save a screenshot.
    Screenshot(PathBuf),
    /// Save a PNG sequence between two timestamps (seconds).
    Sequence {
        /// Start second.
        start: f64,
        /// End second.
        end: f64,
    },
    /// Delay subsequent commands.
    Wait(f64),
    /// Force all uniforms to be updated.
    Update,
    /// Reload every watched file, or only `filename`.
    Reload(Option<String>),
    /// Move the viewer's camera.
    CameraPosition([f32; 3]),
    /// Drop every loaded model.
    ClearModels,
    /// Move the default light.
    LightPosition([f32; 3]),
    /// Skybox ground colour.
    SkyboxGround([f32; 3]),
    /// Skybox turbidity.
    SkyTurbidity(f32),
    /// Show/hide the skybox.
    Sky(Toggle),
    /// Enable/disable the cubemap.
    Cubemap(Toggle),
    /// Show/hide loaded textures on the viewport.
    Textures(Toggle),
    /// Show/hide render passes and buffers.
    Buffers(Toggle),
    /// Show/hide the luma histogram.
    Plot(Toggle),
    /// Show/hide model bounding boxes.
    BoundingBoxes(Toggle),
    /// Anything else, sent verbatim.
    Raw(String),
}

impl Command {
    /// Build a uniform command from any float slice.
    pub fn uniform(name: impl Into<String>, values: &[f32]) -> Self {
        Command::Uniform {
            name: name.into(),
            values: SmallVec::from_slice(values),
        }
    }

    /// Render the command as a wire line (without the trailing newline).
    pub fn to_line(&self) -> String {
        match self {
            Command::Exit => "exit".to_string(),
            Command::Time => "time".to_string(),
            Command::Delta => "delta".to_string(),
            Command::Fps => "fps".to_string(),
            Command::Source(stage) => stage.wire_name().to_string(),
            Command::Uniform { name, values } => join_floats(name, values),
            Command::Screenshot(path) => format!("screenshot,{}", path.display()),
            Command::Sequence { start, end } => format!("sequence,{start},{end}"),
            Command::Wait(secs) => format!("wait,{secs}"),
            Command::Update => "update".to_string(),
            Command::Reload(None) => "reload".to_string(),
            Command::Reload(Some(file)) if file.is_empty() => "reload".to_string(),
            Command::Reload(Some(file)) => format!("reload,{file}"),
            Command::CameraPosition(p) => join_floats("camera_position", p),
            Command::ClearModels => "models,clear".to_string(),
            Command::LightPosition(p) => join_floats("light_position", p),
            Command::SkyboxGround(c) => join_floats("skybox_ground", c),
            Command::SkyTurbidity(t) => format!("sky_turbidity,{t}"),
            Command::Sky(t) => format!("sky,{}", t.on_off()),
            Command::Cubemap(t) => format!("cubemap,{}", t.on_off()),
            Command::Textures(t) => format!("textures,{}", t.on_off()),
            Command::Buffers(t) => format!("buffers,{}", t.show_hide()),
            Command::Plot(Toggle::On) => "plot,luma".to_string(),
            Command::Plot(Toggle::Off) => "plot,off".to_string(),
            Command::BoundingBoxes(t) => format!("bboxes,{}", t.on_off()),
            Command::Raw(line) => line.clone(),
        }
    }
}

fn join_floats(head: &str, values: &[f32]) -> String {
    let mut line = head.to_string();
    for v in values {
        // Writing into a String cannot fail.
        let _ = write!(line, ",{v}");
    }
    line
}

/// Result of one read/request on the control channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Text the viewer wrote back (trailing whitespace trimmed).
    Text(String),
    /// Nothing available yet, or the viewer answered `none`.
    Empty,
    /// The channel is not running (never started, stopped, or the pipe broke).
    Closed,
}

impl Reply {
    /// Classify raw bytes read from the viewer's stdout.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        let text = text.trim_end();
        if text.is_empty() || text == NONE_SENTINEL {
            Reply::Empty
        } else {
            Reply::Text(text.to_string())
        }
    }

    /// Reply text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Reply::Text(t) => Some(t),
            Reply::Empty | Reply::Closed => None,
        }
    }

    /// Parse the first line as a plain decimal number (see [`parse_numeric`]).
    pub fn numeric(&self) -> Option<f64> {
        self.text()
            .and_then(|t| t.split('\n').next())
            .and_then(parse_numeric)
    }

    /// `true` unless the channel reported itself closed.
    pub fn is_open(&self) -> bool {
        !matches!(self, Reply::Closed)
    }
}

/// Parse `s` when it is ASCII digits with at most one decimal point.
///
/// Signs, exponents, whitespace and `nan`/`inf` are all rejected.
pub fn parse_numeric(s: &str) -> Option<f64> {
    let mut digits = 0usize;
    let mut dots = 0usize;
    for c in s.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return None,
        }
    }
    if digits == 0 || dots > 1 {
        return None;
    }
    s.parse::<f64>().ok()
}

#[cfg(test)]
#[path = "../../tests/unit/channel/protocol.rs"]
mod tests;
