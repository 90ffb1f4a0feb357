//! Renderer capability surface and its backings.

/// The [`handle::EngineHandle`] trait and upload types.
pub mod handle;
/// In-process engine that records calls.
pub mod recording;
/// Engine driven over a glslViewer control channel.
pub mod remote;
