//! transport::traits
//!
//! Transport trait definition for talking to a remote object store.
//!
//! # Design
//!
//! The `Transport` trait is async because every operation involves
//! network I/O. It is deliberately minimal: fetch a JSON document, or
//! submit a request body and get JSON back. URL construction, wire-shape
//! parsing, and transaction encoding all live above this seam, so tests
//! can swap in [`MockTransport`](crate::transport::mock::MockTransport)
//! and wire-level concerns stay in one place.
//!
//! Timeouts and cancellation are a transport implementation's job; they
//! surface to callers as `TransportError`. This layer never retries.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors from transport operations.
///
/// Surfaced to callers unmodified; the layers above perform no retries
/// and no partial-application recovery.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server answered with a non-success status.
    #[error("HTTP error: {status} - {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Error message from the server
        message: String,
    },

    /// The response body was not the JSON the caller expects.
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

/// The Transport trait: the crate's only doorway to the network.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Get the transport name (e.g. `"http"`, `"mock"`).
    fn name(&self) -> &'static str;

    /// Fetch a JSON document via GET.
    async fn fetch_json(&self, url: &str) -> Result<Value, TransportError>;

    /// Submit a request body via POST and return the parsed JSON reply.
    ///
    /// # Arguments
    ///
    /// * `url` - Fully-formed endpoint URL
    /// * `body` - The request body, already encoded
    /// * `content_type` - Value for the Content-Type header
    async fn submit(
        &self,
        url: &str,
        body: &str,
        content_type: &str,
    ) -> Result<Value, TransportError>;
}
