//! Thin JSON client for the game-library backend.
//!
//! Every backend route answers with a `{ "success": bool, ... }` envelope.
//! Non-2xx statuses and `success: false` bodies both become [`BackendError`]s
//! carrying the backend's `message`.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::auth::Session;
use crate::config::BackendConfig;

/// Errors talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Backend rejected request: {0}")]
    Rejected(String),

    #[error("Failed to parse backend response: {0}")]
    Parse(String),
}

impl BackendError {
    /// HTTP status reported by the backend, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            BackendError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Shared HTTP client for backend routes.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client from configuration.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, &config.base_url))
    }

    /// Create a client around an existing reqwest client.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a backend path (path starts with '/').
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request, attaching the session's bearer token when given.
    pub fn request(&self, method: Method, path: &str, session: Option<&Session>) -> RequestBuilder {
        let mut request = self.client.request(method, self.url(path));
        if let Some(session) = session {
            request = request.bearer_auth(session.token());
        }
        request
    }

    /// Send a request and decode the success envelope into `T`.
    pub async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(status = status.as_u16(), bytes = body.len(), "Backend response");

        let value: Option<Value> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let message = value
                .as_ref()
                .and_then(envelope_message)
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let value = value.ok_or_else(|| BackendError::Parse("response is not JSON".to_string()))?;

        if value.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(BackendError::Rejected(
                envelope_message(&value).unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        serde_json::from_value(value).map_err(|e| BackendError::Parse(e.to_string()))
    }
}

fn envelope_message(value: &Value) -> Option<String> {
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = BackendClient::with_client(Client::new(), "http://backend:5000/api/");
        assert_eq!(client.base_url(), "http://backend:5000/api");
        assert_eq!(client.url("/games/search"), "http://backend:5000/api/games/search");
    }

    #[test]
    fn test_envelope_message_prefers_message() {
        let value = json!({ "success": false, "message": "Game not found", "error": "x" });
        assert_eq!(envelope_message(&value).as_deref(), Some("Game not found"));

        let value = json!({ "error": "boom" });
        assert_eq!(envelope_message(&value).as_deref(), Some("boom"));

        assert_eq!(envelope_message(&json!({})), None);
    }

    #[test]
    fn test_status_accessor() {
        let err = BackendError::Status {
            status: 404,
            message: "missing".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(BackendError::Rejected("no".to_string()).status(), None);
    }
}
