/// Convenience result type used across gvbridge.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Top-level error taxonomy used by bridge APIs.
#[derive(thiserror::Error, Debug)]
pub enum BridgeError {
    /// Invalid user-provided configuration or host data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failures spawning or talking to the external viewer process.
    #[error("channel error: {0}")]
    Channel(String),

    /// An engine handle rejected or failed to apply an operation.
    #[error("engine error: {0}")]
    Engine(String),

    /// Host data that cannot be converted into renderer structures.
    #[error("translation error: {0}")]
    Translation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BridgeError {
    /// Build a [`BridgeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BridgeError::Channel`] value.
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    /// Build a [`BridgeError::Engine`] value.
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Build a [`BridgeError::Translation`] value.
    pub fn translation(msg: impl Into<String>) -> Self {
        Self::Translation(msg.into())
    }

    /// Build a [`BridgeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
