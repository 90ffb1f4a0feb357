//! Incremental mirroring of host scene changes into an engine.

/// Typed engine settings.
pub mod config;
/// Per-object sync records.
pub mod records;
/// Upload-once texture/cubemap cache.
pub mod resources;
/// Shader buffer hot reload.
pub mod shaders;
/// The scene synchronizer.
pub mod synchronizer;
