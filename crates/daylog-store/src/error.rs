//! Store error types.

use daylog_backend::BackendError;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// An id was not present in the current snapshot.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: i64) -> Self {
        Self::NotFound { kind, id }
    }

    /// Returns true if retrying the operation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Backend(e) => e.is_retryable(),
            Self::NotFound { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(StoreError::not_found("event", 3).to_string(), "event 3 not found");

        let err = StoreError::from(BackendError::network("connection refused"));
        assert_eq!(err.to_string(), "network_error: connection refused");
        assert!(err.is_retryable());
    }
}
