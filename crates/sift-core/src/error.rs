//! Error types for sift.

use thiserror::Error;

/// Result type alias using sift's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for sift operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A caller supplied a filter at a location the server has locked down
    /// (DISABLE rule hit, or OVERRIDE rule superseded). Surfaces to the
    /// caller as a rejected request.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Server-side field-rule or group misconfiguration. Indicates a bug in
    /// policy code, not in caller input.
    #[error("Policy error: {0}")]
    Policy(String),

    /// Caller input failed type-specific validation (malformed ObjectId,
    /// unparseable date).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
