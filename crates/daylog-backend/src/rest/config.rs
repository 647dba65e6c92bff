//! REST backend configuration.

use std::time::Duration;

use url::Url;

use crate::error::{BackendError, BackendResult};

/// Configuration for the REST backend.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Base URL of the daylog server. Endpoint paths are appended to it.
    pub base_url: Url,

    /// Bearer token sent with every request.
    pub token: Option<String>,

    /// Request timeout.
    pub timeout: Duration,

    pub user_agent: String,
}

impl RestConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL does not parse or is not
    /// http(s).
    pub fn new(base_url: impl AsRef<str>) -> BackendResult<Self> {
        let raw = base_url.as_ref();
        let parsed = Url::parse(raw).map_err(|e| {
            BackendError::configuration(format!("invalid base_url {raw:?}: {e}")).with_source(e)
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BackendError::configuration(format!(
                "base_url must be http or https, got {:?}",
                parsed.scheme()
            )));
        }
        Ok(Self {
            base_url: parsed,
            token: None,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("daylog/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves an endpoint path against the base URL, keeping any path
    /// prefix the base URL has.
    pub fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url
    }
}
