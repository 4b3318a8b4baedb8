//! transport::mock
//!
//! Mock transport implementation for deterministic testing.
//!
//! # Design
//!
//! The mock transport serves canned JSON documents keyed by URL and
//! records every operation, so tests can verify exactly which requests a
//! higher layer issued. Failure scenarios are injected per operation
//! kind.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use strata::transport::mock::MockTransport;
//! use strata::transport::Transport;
//!
//! # tokio_test::block_on(async {
//! let transport = MockTransport::new()
//!     .respond("http://store/refs", json!({"master": {"type": "branch"}}));
//!
//! let refs = transport.fetch_json("http://store/refs").await.unwrap();
//! assert_eq!(refs["master"]["type"], "branch");
//! assert_eq!(transport.operations().len(), 1);
//! # });
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::traits::{Transport, TransportError};

/// Mock transport for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockTransport {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockTransportInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockTransportInner {
    /// Canned GET responses keyed by URL.
    responses: HashMap<String, Value>,
    /// Reply returned for submissions.
    submit_response: Value,
    /// Operation to fail (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
    /// Recorded submissions, with full bodies.
    submissions: Vec<Submission>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail fetch_json with the given error.
    Fetch(TransportError),
    /// Fail submit with the given error.
    Submit(TransportError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone)]
pub enum MockOperation {
    Fetch { url: String },
    Submit { url: String, content_type: String },
}

/// A recorded submission, body included.
#[derive(Debug, Clone)]
pub struct Submission {
    pub url: String,
    pub body: String,
    pub content_type: String,
}

impl MockTransport {
    /// Create a new empty mock transport.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockTransportInner {
                responses: HashMap::new(),
                submit_response: json!({}),
                fail_on: None,
                operations: Vec::new(),
                submissions: Vec::new(),
            })),
        }
    }

    /// Serve `value` for GETs of `url`.
    pub fn respond(self, url: impl Into<String>, value: Value) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.responses.insert(url.into(), value);
        }
        self
    }

    /// Reply to submissions with `value` instead of the default `{}`.
    pub fn submit_response(self, value: Value) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.submit_response = value;
        }
        self
    }

    /// Configure the mock to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Get all recorded submissions.
    pub fn submissions(&self) -> Vec<Submission> {
        let inner = self.inner.lock().unwrap();
        inner.submissions.clone()
    }

    /// Number of recorded submissions.
    pub fn submission_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.submissions.len()
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, TransportError> {
        self.record(MockOperation::Fetch {
            url: url.to_string(),
        });

        let inner = self.inner.lock().unwrap();
        if let Some(FailOn::Fetch(e)) = &inner.fail_on {
            return Err(e.clone());
        }
        inner
            .responses
            .get(url)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(url.to_string()))
    }

    async fn submit(
        &self,
        url: &str,
        body: &str,
        content_type: &str,
    ) -> Result<Value, TransportError> {
        self.record(MockOperation::Submit {
            url: url.to_string(),
            content_type: content_type.to_string(),
        });

        let mut inner = self.inner.lock().unwrap();
        if let Some(FailOn::Submit(e)) = &inner.fail_on {
            return Err(e.clone());
        }
        inner.submissions.push(Submission {
            url: url.to_string(),
            body: body.to_string(),
            content_type: content_type.to_string(),
        });
        Ok(inner.submit_response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_canned_response() {
        let transport = MockTransport::new().respond("http://store/refs", json!({"ok": true}));
        let value = transport.fetch_json("http://store/refs").await.unwrap();
        assert_eq!(value, json!({"ok": true}));
    }

    #[tokio::test]
    async fn unknown_url_is_not_found() {
        let transport = MockTransport::new();
        let result = transport.fetch_json("http://store/unknown").await;
        assert!(matches!(result, Err(TransportError::NotFound(_))));
    }

    #[tokio::test]
    async fn submit_records_body_and_content_type() {
        let transport = MockTransport::new();
        transport
            .submit("http://store/transactions", "payload", "multipart/mixed")
            .await
            .unwrap();

        let submissions = transport.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].url, "http://store/transactions");
        assert_eq!(submissions[0].body, "payload");
        assert_eq!(submissions[0].content_type, "multipart/mixed");
    }

    #[tokio::test]
    async fn submit_returns_configured_response() {
        let transport = MockTransport::new().submit_response(json!({"sha1": "abc"}));
        let reply = transport
            .submit("http://store/transactions", "payload", "multipart/mixed")
            .await
            .unwrap();
        assert_eq!(reply["sha1"], "abc");
    }

    #[tokio::test]
    async fn fail_on_fetch() {
        let transport = MockTransport::new()
            .respond("http://store/refs", json!({}))
            .fail_on(FailOn::Fetch(TransportError::Network("down".into())));
        let result = transport.fetch_json("http://store/refs").await;
        assert!(matches!(result, Err(TransportError::Network(_))));
    }

    #[tokio::test]
    async fn fail_on_submit_records_no_submission() {
        let transport = MockTransport::new().fail_on(FailOn::Submit(TransportError::Http {
            status: 500,
            message: "boom".into(),
        }));
        let result = transport
            .submit("http://store/transactions", "payload", "multipart/mixed")
            .await;
        assert!(matches!(result, Err(TransportError::Http { .. })));
        assert_eq!(transport.submission_count(), 0);
    }

    #[tokio::test]
    async fn operations_recorded() {
        let transport = MockTransport::new().respond("http://store/refs", json!({}));
        transport.fetch_json("http://store/refs").await.unwrap();
        transport
            .submit("http://store/transactions", "p", "multipart/mixed")
            .await
            .unwrap();

        let ops = transport.operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], MockOperation::Fetch { .. }));
        assert!(matches!(ops[1], MockOperation::Submit { .. }));
    }

    #[test]
    fn transport_name() {
        assert_eq!(MockTransport::new().name(), "mock");
    }
}
