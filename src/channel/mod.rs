//! Out-of-process control of a glslViewer instance over its stdin/stdout console.

/// Launch options and argv composition.
pub mod options;
/// Process ownership and non-blocking request/response I/O.
pub mod process;
/// Wire commands and reply parsing.
pub mod protocol;
