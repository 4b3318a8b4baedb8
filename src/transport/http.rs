//! transport::http
//!
//! HTTP transport implementation backed by `reqwest`.
//!
//! # Design
//!
//! Responses are handled in two steps: status inspection first, body
//! decode second. Non-success statuses map to typed errors (404 becomes
//! `NotFound`, everything else `Http`); a success status with an
//! undecodable body becomes `InvalidBody`. Connection-level failures
//! become `Network`.
//!
//! Timeouts come from [`ClientConfig`] and are applied per request. No
//! retries happen here; failures surface to the caller verbatim.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::traits::{Transport, TransportError};
use crate::config::ClientConfig;

/// HTTP transport over a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// HTTP client for making requests
    client: Client,
    /// User-Agent header value
    user_agent: String,
    /// Per-request timeout
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport with default configuration.
    pub fn new() -> Self {
        Self::with_config(&ClientConfig::default())
    }

    /// Create a transport from a [`ClientConfig`].
    pub fn with_config(config: &ClientConfig) -> Self {
        Self {
            client: Client::new(),
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Handle a response, mapping errors appropriately.
    async fn handle_response(&self, url: &str, response: Response) -> Result<Value, TransportError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| TransportError::InvalidBody(e.to_string()));
        }

        let message = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => TransportError::NotFound(url.to_string()),
            _ => TransportError::Http {
                status: status.as_u16(),
                message,
            },
        })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, TransportError> {
        debug!(url, "fetching JSON");
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        self.handle_response(url, response).await
    }

    async fn submit(
        &self,
        url: &str,
        body: &str,
        content_type: &str,
    ) -> Result<Value, TransportError> {
        debug!(url, content_type, bytes = body.len(), "submitting");
        let response = self
            .client
            .post(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, content_type)
            .timeout(self.timeout)
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        self.handle_response(url, response).await
    }
}
