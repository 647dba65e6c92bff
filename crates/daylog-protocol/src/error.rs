//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while encoding or decoding REST bodies.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Body exceeds maximum allowed size.
    #[error("body too large: {size} bytes (max: {max})")]
    BodyTooLarge { size: usize, max: usize },

    /// Failed to serialize or deserialize JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Empty body where a document was expected.
    #[error("empty body")]
    EmptyBody,

    /// A field the client relies on was null or absent.
    #[error("{entity} is missing required field `{field}`")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },
}

impl ProtocolError {
    /// Creates a missing field error.
    pub fn missing(entity: &'static str, field: &'static str) -> Self {
        Self::MissingField { entity, field }
    }
}
