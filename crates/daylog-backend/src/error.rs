//! Error types for backend operations.

use std::fmt;

use daylog_protocol::ProtocolError;
use thiserror::Error;

/// The category of a backend error.
///
/// Used by callers to decide between retrying, re-authenticating and
/// reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendErrorCode {
    /// Missing or expired token (401).
    AuthenticationFailed,
    /// The user may not touch this resource (403).
    AuthorizationFailed,
    /// Connection failed, timed out, DNS resolution, etc.
    NetworkError,
    /// Too many requests (429).
    RateLimited,
    /// Server returned a 5xx status.
    ServerError,
    /// Body could not be parsed or had an unexpected shape.
    InvalidResponse,
    /// Resource not found (404).
    NotFound,
    /// Request was rejected as invalid (400).
    BadRequest,
    /// Missing or invalid backend configuration.
    ConfigurationError,
    /// Reading or writing local storage failed.
    StorageError,
    /// Unexpected state.
    InternalError,
}

impl BackendErrorCode {
    /// Returns true if this error is transient and the operation may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServerError
        )
    }

    /// Maps an HTTP error status to a code.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => Self::BadRequest,
            401 => Self::AuthenticationFailed,
            403 => Self::AuthorizationFailed,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            500..=599 => Self::ServerError,
            _ => Self::InvalidResponse,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::ConfigurationError => "configuration_error",
            Self::StorageError => "storage_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for BackendErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while talking to a backend.
#[derive(Debug, Error)]
pub struct BackendError {
    code: BackendErrorCode,
    message: String,
    /// The backend that produced the error ("rest", "file").
    backend: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BackendError {
    pub fn new(code: BackendErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            backend: None,
            source: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::AuthenticationFailed, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::NetworkError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::InvalidResponse, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::NotFound, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::ConfigurationError, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::StorageError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::InternalError, message)
    }

    /// Creates an error from an HTTP error status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::from_status(status), message)
    }

    /// Sets the backend name for this error.
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> BackendErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn backend(&self) -> Option<&str> {
        self.backend.as_deref()
    }

    /// Returns true if this error is transient and may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref backend) = self.backend {
            write!(f, "[{}] ", backend)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<ProtocolError> for BackendError {
    fn from(err: ProtocolError) -> Self {
        Self::invalid_response(err.to_string()).with_source(err)
    }
}

/// A specialized Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
