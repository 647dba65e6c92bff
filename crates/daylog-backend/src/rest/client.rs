//! HTTP client for the daylog REST API.
//!
//! Sends JSON bodies with bearer authentication and maps error statuses
//! to [`BackendError`] codes, using the server's error message when the
//! response carries one.

use daylog_protocol::{decode_body, decode_error_body, encode_body};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use crate::error::{BackendError, BackendResult};

use super::config::RestConfig;

/// HTTP client for the daylog server.
pub struct RestClient {
    client: Client,
    config: RestConfig,
}

impl RestClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: RestConfig) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| BackendError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Performs a GET request and decodes the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        let body = self.execute(self.request(Method::GET, path)).await?;
        Ok(decode_body(&body)?)
    }

    /// Sends a JSON body and decodes the JSON response.
    pub async fn send<B, T>(&self, method: Method, path: &str, body: &B) -> BackendResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = encode_body(body)?;
        let request = self
            .request(method, path)
            .header(CONTENT_TYPE, "application/json")
            .body(payload);
        let body = self.execute(request).await?;
        Ok(decode_body(&body)?)
    }

    /// Sends `multipart/form-data` text fields and decodes the JSON response.
    pub async fn send_form<T, I>(&self, method: Method, path: &str, fields: I) -> BackendResult<T>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = (&'static str, String)>,
    {
        let form = fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));
        let body = self.execute(self.request(method, path).multipart(form)).await?;
        Ok(decode_body(&body)?)
    }

    /// Performs a DELETE request, ignoring any response body.
    pub async fn delete(&self, path: &str) -> BackendResult<()> {
        self.execute(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.config.endpoint(path);
        trace!(method = %method, url = %url, "Sending request");
        let request = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json");
        match self.config.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> BackendResult<Vec<u8>> {
        let response = request.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("Request timed out: {}", e)
            } else {
                format!("Request failed: {}", e)
            };
            BackendError::network(message).with_source(e)
        })?;

        let status = response.status();
        trace!(status = %status, "Received response");

        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::network(format!("Failed to read response: {}", e)))?;

        if status.is_success() {
            return Ok(body.to_vec());
        }

        Err(status_error(status, &body))
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url.as_str()
    }
}

/// Builds the error for a non-success response.
fn status_error(status: StatusCode, body: &[u8]) -> BackendError {
    let message = match decode_error_body(body) {
        Some(api_error) => api_error.summary(),
        None => default_message(status),
    };
    if status.is_server_error() {
        warn!(status = %status, message = %message, "Server error");
    } else {
        debug!(status = %status, message = %message, "Request rejected");
    }
    BackendError::from_status(status.as_u16(), message)
}

fn default_message(status: StatusCode) -> String {
    match status {
        StatusCode::UNAUTHORIZED => "Authentication failed: token missing or expired".to_string(),
        StatusCode::FORBIDDEN => "Access denied".to_string(),
        StatusCode::NOT_FOUND => "Resource not found".to_string(),
        StatusCode::TOO_MANY_REQUESTS => "Too many requests to server".to_string(),
        s => format!("Unexpected status {}", s),
    }
}
