//! Error types for session operations.

use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Result type for key-value backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Session-specific errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend error
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Failures reported by a [`KeyValueBackend`](crate::backend::KeyValueBackend).
///
/// Adapters convert their client-specific errors into one of these variants,
/// so no store SDK type ever reaches the session interface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The call did not complete within the configured bound.
    #[error("{0} timed out")]
    Timeout(&'static str),

    /// The store could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The store rejected or failed the call.
    #[error("Store error: {0}")]
    Service(String),

    /// The store returned an item that does not have the expected shape.
    #[error("Malformed item: {0}")]
    MalformedItem(String),
}

impl BackendError {
    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a service error.
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service(message.into())
    }

    /// Create a malformed item error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedItem(message.into())
    }
}
