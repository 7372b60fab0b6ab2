//! Error types for registry operations.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the model registry.
#[derive(Debug, Error)]
pub enum Error {
    /// A find request was issued without a usable identifying strategy.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The resource being registered already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server rejected the request with a structured error body.
    #[error("registry error (status {status}): {code}: {message}")]
    Remote {
        /// HTTP status code of the response.
        status: u16,
        /// Error code reported by the server.
        code: String,
        /// Error message reported by the server.
        message: String,
    },

    /// The HTTP request could not be completed.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The client is misconfigured (bad base URL, unbuildable HTTP client).
    /// Fatal, never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error is the server saying the resource is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_)) || matches!(self, Error::Remote { status: 404, .. })
    }
}
