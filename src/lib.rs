//! gvbridge keeps a long-lived glslViewer instance in step with a host application's live 3D
//! scene.
//!
//! - Drive the viewer process with a [`ControlChannel`]
//! - Program against the [`EngineHandle`] capability surface ([`RemoteEngine`] over the channel,
//!   [`RecordingEngine`] in-process)
//! - Feed host change events to a [`SceneSynchronizer`], which translates meshes, lights and
//!   cameras and pushes the minimal set of engine mutations
//! - Own engine lifetimes (preview and final renders) with an [`EngineContext`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Viewer process control and wire protocol.
pub mod channel;
/// Engine capability trait and backings.
pub mod engine;
/// Host boundary types and traits.
pub mod host;
/// Engine lifetime ownership.
pub mod session;
/// Incremental scene synchronization.
pub mod sync;
/// Host-to-renderer conversions.
pub mod translate;

pub use crate::foundation::core::{
    EngineMatrix, ExecutionMode, HOST_IDENTITY, HostMatrix, Resolution, Rgb, ShaderStage,
};
pub use crate::foundation::error::{BridgeError, BridgeResult};

pub use crate::channel::options::{UniformKind, UniformValue, ViewerOptions};
pub use crate::channel::process::{ChannelTiming, ControlChannel, Sample};
pub use crate::channel::protocol::{Command, Reply};
pub use crate::engine::handle::{
    EngineHandle, EngineResult, TextureSource, TextureUpload, UploadKind,
};
pub use crate::engine::recording::{CallLog, EngineCall, RecordingEngine};
pub use crate::engine::remote::RemoteEngine;
pub use crate::host::{HostScene, MemoryScene, MemoryTextStore, TextStore};
pub use crate::session::{EngineContext, EngineFactory};
pub use crate::sync::config::SyncConfig;
pub use crate::sync::synchronizer::{SceneSynchronizer, SyncReport};
pub use crate::translate::camera::{CameraConstants, CameraState};
