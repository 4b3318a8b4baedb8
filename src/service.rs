//! service
//!
//! High-level operations against one store service.
//!
//! A [`Service`] pairs a base URL with a [`Transport`] and exposes the
//! read operations (refs, commits, schema, objects) plus transaction
//! submission. It owns all URL construction; the transport only ever
//! sees fully-formed URLs and encoded bodies.
//!
//! Commits do not point back at the service they came from. Callers keep
//! the `Service` handle and pass commits back into it, which keeps
//! parsed values immutable and free of hidden ownership.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::{ClientConfig, ConfigError};
use crate::core::history::{Commit, HistoryError, Ref};
use crate::core::object::{ObjectError, TypedObject};
use crate::core::schema::{Schema, SchemaError};
use crate::core::types::CommitId;
use crate::transaction::{CommitMeta, Transaction, TransactionError};
use crate::transport::http::HttpTransport;
use crate::transport::{Transport, TransportError};

/// Errors from service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The transport reported a failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A schema payload could not be parsed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// An object payload could not be parsed.
    #[error(transparent)]
    Object(#[from] ObjectError),

    /// A commit or ref payload could not be parsed.
    #[error(transparent)]
    History(#[from] HistoryError),

    /// A transaction could not be committed.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// The payload parsed as JSON but not as the expected shape.
    #[error("unexpected payload shape: {0}")]
    UnexpectedShape(String),
}

/// Join URL segments with single slashes.
///
/// Each segment is stripped of leading/trailing whitespace and slashes,
/// so joining never produces doubled or missing separators.
///
/// # Example
///
/// ```
/// use strata::service::urljoin;
///
/// let url = urljoin(["http://store.example.org/", "/refs/", "master"]);
/// assert_eq!(url, "http://store.example.org/refs/master");
/// ```
pub fn urljoin<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|segment| {
            segment
                .as_ref()
                .trim_matches(|c: char| c.is_whitespace() || c == '/')
                .to_string()
        })
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// One store service: a base URL plus the transport used to reach it.
#[derive(Clone)]
pub struct Service {
    /// Base URL of the service.
    url: String,
    /// Transport all requests flow through.
    transport: Arc<dyn Transport>,
}

// Manual Debug: `dyn Transport` has no Debug bound.
impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("url", &self.url)
            .field("transport", &self.transport.name())
            .finish()
    }
}

impl Service {
    /// Create a service over an explicit transport.
    pub fn new(url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            url: url.into(),
            transport,
        }
    }

    /// Create a service over HTTP with default configuration.
    pub fn over_http(url: impl Into<String>) -> Self {
        Self::new(url, Arc::new(HttpTransport::new()))
    }

    /// Create a service over HTTP from a [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when the config carries no URL.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let url = config
            .url
            .clone()
            .ok_or_else(|| ConfigError::InvalidValue("url is required".into()))?;
        Ok(Self::new(url, Arc::new(HttpTransport::with_config(config))))
    }

    /// The service's base URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn endpoint(&self, segments: &[&str]) -> String {
        urljoin(std::iter::once(self.url.as_str()).chain(segments.iter().copied()))
    }

    /// Fetch all refs, keyed by canonical ref name.
    pub async fn refs(&self) -> Result<BTreeMap<String, Ref>, ServiceError> {
        let data = self.transport.fetch_json(&self.endpoint(&["refs"])).await?;
        let map = data
            .as_object()
            .ok_or_else(|| ServiceError::UnexpectedShape("refs payload is not an object".into()))?;

        let mut refs = BTreeMap::new();
        for (name, value) in map {
            refs.insert(name.clone(), Ref::from_wire(value)?);
        }
        debug!(url = %self.url, count = refs.len(), "fetched refs");
        Ok(refs)
    }

    /// Fetch one ref by name or alias.
    pub async fn ref_named(&self, name: &str) -> Result<Ref, ServiceError> {
        let data = self
            .transport
            .fetch_json(&self.endpoint(&["refs", name]))
            .await?;
        Ok(Ref::from_wire(&data)?)
    }

    /// Fetch a commit by SHA1.
    pub async fn commit(&self, sha1: &CommitId) -> Result<Commit, ServiceError> {
        let data = self
            .transport
            .fetch_json(&self.endpoint(&["commits", sha1.as_str()]))
            .await?;
        Ok(Commit::from_wire(&data)?)
    }

    /// Fetch the service name as of a commit.
    pub async fn name(&self, commit: &Commit) -> Result<String, ServiceError> {
        let data = self
            .transport
            .fetch_json(&self.endpoint(&["commits", commit.sha1.as_str(), "name"]))
            .await?;
        data.as_str().map(str::to_string).ok_or_else(|| {
            ServiceError::UnexpectedShape("service name is not a string".into())
        })
    }

    /// Fetch the service aliases as of a commit.
    ///
    /// The reply shape is not part of the server contract in scope here,
    /// so it is passed through as raw JSON.
    pub async fn services(&self, commit: &Commit) -> Result<Value, ServiceError> {
        Ok(self
            .transport
            .fetch_json(&self.endpoint(&["commits", commit.sha1.as_str(), "services"]))
            .await?)
    }

    /// Fetch the schema as of a commit.
    pub async fn schema(&self, commit: &Commit) -> Result<Schema, ServiceError> {
        let data = self
            .transport
            .fetch_json(&self.endpoint(&["commits", commit.sha1.as_str(), "schema"]))
            .await?;
        Ok(Schema::from_wire(&data)?)
    }

    /// Fetch all objects in a commit, grouped by class name.
    pub async fn objects(
        &self,
        commit: &Commit,
    ) -> Result<BTreeMap<String, Vec<TypedObject>>, ServiceError> {
        let data = self
            .transport
            .fetch_json(&self.endpoint(&["commits", commit.sha1.as_str(), "objects"]))
            .await?;
        let map = data.as_object().ok_or_else(|| {
            ServiceError::UnexpectedShape("objects payload is not an object".into())
        })?;

        let mut objects = BTreeMap::new();
        for (class_name, records) in map {
            let records = records.as_array().ok_or_else(|| {
                ServiceError::UnexpectedShape(format!(
                    "objects of class '{class_name}' are not a list"
                ))
            })?;
            let mut parsed = Vec::with_capacity(records.len());
            for record in records {
                parsed.push(TypedObject::from_wire(class_name, record)?);
            }
            objects.insert(class_name.clone(), parsed);
        }
        Ok(objects)
    }

    /// Fetch the objects of one class in a commit.
    ///
    /// Accepts both reply shapes servers use: a flat list of records, or
    /// a grouped map carrying the class as a key.
    pub async fn objects_of_class(
        &self,
        commit: &Commit,
        klass: &str,
    ) -> Result<Vec<TypedObject>, ServiceError> {
        let data = self
            .transport
            .fetch_json(&self.endpoint(&[
                "commits",
                commit.sha1.as_str(),
                "classes",
                klass,
                "objects",
            ]))
            .await?;

        let records = match &data {
            Value::Array(records) => records.as_slice(),
            Value::Object(map) => match map.get(klass) {
                Some(Value::Array(records)) => records.as_slice(),
                Some(_) => {
                    return Err(ServiceError::UnexpectedShape(format!(
                        "objects of class '{klass}' are not a list"
                    )))
                }
                None => &[],
            },
            _ => {
                return Err(ServiceError::UnexpectedShape(
                    "objects payload is neither a list nor an object".into(),
                ))
            }
        };

        let mut parsed = Vec::with_capacity(records.len());
        for record in records {
            parsed.push(TypedObject::from_wire(klass, record)?);
        }
        Ok(parsed)
    }

    /// Fetch a single object by UUID.
    pub async fn object(&self, commit: &Commit, uuid: &str) -> Result<TypedObject, ServiceError> {
        let data = self
            .transport
            .fetch_json(&self.endpoint(&["commits", commit.sha1.as_str(), "objects", uuid]))
            .await?;
        Ok(TypedObject::from_wire_single(&data)?)
    }

    /// The endpoint transactions are submitted to.
    pub fn transactions_url(&self) -> String {
        self.endpoint(&["transactions"])
    }

    /// Seal and submit a transaction through this service's transport.
    ///
    /// Returns the server's reply (the new commit/ref state) on success.
    pub async fn commit_transaction(
        &self,
        transaction: &mut Transaction,
        meta: &CommitMeta,
    ) -> Result<Value, ServiceError> {
        Ok(transaction
            .commit(meta, self.transport.as_ref(), &self.transactions_url())
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use serde_json::json;

    const SHA: &str = "b51a382a91a29b41ea2e49e823b84b503cbe1f5f";

    fn commit_record() -> Value {
        json!({
            "sha1": SHA,
            "author": "Ada <ada@example.org>",
            "author-date": "1379698304 +0100",
            "committer": "Ada <ada@example.org>",
            "committer-date": "1379698304 +0100",
            "parents": [],
            "subject": "Initial import",
        })
    }

    fn service_with(transport: MockTransport) -> Service {
        Service::new("http://store.example.org", Arc::new(transport))
    }

    async fn head_commit(service: &Service) -> Commit {
        let sha = CommitId::new(SHA).unwrap();
        service.commit(&sha).await.unwrap()
    }

    fn transport_for_commit() -> MockTransport {
        MockTransport::new().respond(
            format!("http://store.example.org/commits/{SHA}"),
            commit_record(),
        )
    }

    mod urljoin_behavior {
        use super::*;

        #[test]
        fn strips_redundant_slashes() {
            assert_eq!(
                urljoin(["http://store.example.org/", "/refs/", "/master/"]),
                "http://store.example.org/refs/master"
            );
        }

        #[test]
        fn strips_whitespace() {
            assert_eq!(urljoin([" a ", " b"]), "a/b");
        }

        #[test]
        fn drops_empty_segments() {
            assert_eq!(urljoin(["a", "", "/", "b"]), "a/b");
        }
    }

    mod reads {
        use super::*;

        #[tokio::test]
        async fn refs_parse_into_map() {
            let transport = MockTransport::new().respond(
                "http://store.example.org/refs",
                json!({
                    "master": {
                        "type": "branch",
                        "url-aliases": ["master"],
                        "head": commit_record(),
                    },
                    "v1": {
                        "type": "tag",
                        "url-aliases": [],
                        "head": commit_record(),
                    },
                }),
            );
            let service = service_with(transport);

            let refs = service.refs().await.unwrap();
            assert_eq!(refs.len(), 2);
            assert_eq!(refs["master"].ref_type, "branch");
            assert_eq!(refs["v1"].ref_type, "tag");
            assert_eq!(refs["master"].head.sha1.as_str(), SHA);
        }

        #[tokio::test]
        async fn refs_reject_non_object_payload() {
            let transport =
                MockTransport::new().respond("http://store.example.org/refs", json!([1, 2]));
            let service = service_with(transport);
            assert!(matches!(
                service.refs().await,
                Err(ServiceError::UnexpectedShape(_))
            ));
        }

        #[tokio::test]
        async fn ref_named_fetches_one_ref() {
            let transport = MockTransport::new().respond(
                "http://store.example.org/refs/master",
                json!({
                    "type": "branch",
                    "url-aliases": ["master"],
                    "head": commit_record(),
                }),
            );
            let service = service_with(transport);

            let reference = service.ref_named("master").await.unwrap();
            assert_eq!(reference.ref_type, "branch");
        }

        #[tokio::test]
        async fn missing_ref_surfaces_not_found() {
            let service = service_with(MockTransport::new());
            let result = service.ref_named("gone").await;
            assert!(matches!(
                result,
                Err(ServiceError::Transport(TransportError::NotFound(_)))
            ));
        }

        #[tokio::test]
        async fn commit_by_sha() {
            let service = service_with(transport_for_commit());
            let commit = head_commit(&service).await;
            assert_eq!(commit.subject, "Initial import");
        }

        #[tokio::test]
        async fn name_as_of_commit() {
            let transport = transport_for_commit().respond(
                format!("http://store.example.org/commits/{SHA}/name"),
                json!("issue-tracker"),
            );
            let service = service_with(transport);
            let commit = head_commit(&service).await;

            assert_eq!(service.name(&commit).await.unwrap(), "issue-tracker");
        }

        #[tokio::test]
        async fn non_string_name_is_unexpected() {
            let transport = transport_for_commit().respond(
                format!("http://store.example.org/commits/{SHA}/name"),
                json!(17),
            );
            let service = service_with(transport);
            let commit = head_commit(&service).await;

            assert!(matches!(
                service.name(&commit).await,
                Err(ServiceError::UnexpectedShape(_))
            ));
        }

        #[tokio::test]
        async fn services_pass_through_raw() {
            let aliases = json!({ "people": "http://people.example.org" });
            let transport = transport_for_commit().respond(
                format!("http://store.example.org/commits/{SHA}/services"),
                aliases.clone(),
            );
            let service = service_with(transport);
            let commit = head_commit(&service).await;

            assert_eq!(service.services(&commit).await.unwrap(), aliases);
        }

        #[tokio::test]
        async fn schema_as_of_commit() {
            let transport = transport_for_commit().respond(
                format!("http://store.example.org/commits/{SHA}/schema"),
                json!({
                    "name": "org.example.schemas.issues.1",
                    "classes": {
                        "issue": { "properties": { "title": { "type": "text" } } }
                    }
                }),
            );
            let service = service_with(transport);
            let commit = head_commit(&service).await;

            let schema = service.schema(&commit).await.unwrap();
            assert_eq!(schema.name, "org.example.schemas.issues.1");
            assert!(schema.class("issue").is_some());
        }

        #[tokio::test]
        async fn objects_grouped_by_class() {
            let transport = transport_for_commit().respond(
                format!("http://store.example.org/commits/{SHA}/objects"),
                json!({
                    "issue": [
                        { "uuid": "5e27f17c-ff22-4c49-82d9-6549f2800d1a",
                          "properties": { "title": "t1" } },
                        { "uuid": "0f60bb2b-3956-4b8e-9c3d-a33dbd4e2e71",
                          "properties": { "title": "t2" } },
                    ],
                    "person": [],
                }),
            );
            let service = service_with(transport);
            let commit = head_commit(&service).await;

            let objects = service.objects(&commit).await.unwrap();
            assert_eq!(objects["issue"].len(), 2);
            assert!(objects["person"].is_empty());
            assert_eq!(objects["issue"][0].klass, "issue");
        }

        #[tokio::test]
        async fn objects_of_class_accepts_flat_list() {
            let transport = transport_for_commit().respond(
                format!("http://store.example.org/commits/{SHA}/classes/issue/objects"),
                json!([
                    { "uuid": "5e27f17c-ff22-4c49-82d9-6549f2800d1a",
                      "properties": { "title": "t1" } },
                ]),
            );
            let service = service_with(transport);
            let commit = head_commit(&service).await;

            let issues = service.objects_of_class(&commit, "issue").await.unwrap();
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].klass, "issue");
        }

        #[tokio::test]
        async fn objects_of_class_accepts_grouped_map() {
            let transport = transport_for_commit().respond(
                format!("http://store.example.org/commits/{SHA}/classes/issue/objects"),
                json!({
                    "issue": [
                        { "uuid": "5e27f17c-ff22-4c49-82d9-6549f2800d1a",
                          "properties": {} },
                    ],
                }),
            );
            let service = service_with(transport);
            let commit = head_commit(&service).await;

            let issues = service.objects_of_class(&commit, "issue").await.unwrap();
            assert_eq!(issues.len(), 1);
        }

        #[tokio::test]
        async fn objects_of_class_empty_when_class_absent_from_group() {
            let transport = transport_for_commit().respond(
                format!("http://store.example.org/commits/{SHA}/classes/issue/objects"),
                json!({ "person": [] }),
            );
            let service = service_with(transport);
            let commit = head_commit(&service).await;

            let issues = service.objects_of_class(&commit, "issue").await.unwrap();
            assert!(issues.is_empty());
        }

        #[tokio::test]
        async fn single_object_by_uuid() {
            let transport = transport_for_commit().respond(
                format!(
                    "http://store.example.org/commits/{SHA}/objects/5e27f17c-ff22-4c49-82d9-6549f2800d1a"
                ),
                json!({
                    "uuid": "5e27f17c-ff22-4c49-82d9-6549f2800d1a",
                    "class": "issue",
                    "properties": { "title": "t1" },
                }),
            );
            let service = service_with(transport);
            let commit = head_commit(&service).await;

            let object = service
                .object(&commit, "5e27f17c-ff22-4c49-82d9-6549f2800d1a")
                .await
                .unwrap();
            assert_eq!(object.klass, "issue");
        }
    }

    mod transactions {
        use super::*;
        use crate::core::types::{RefName, Timestamp};
        use crate::transaction::Properties;

        #[tokio::test]
        async fn commit_transaction_posts_to_transactions_endpoint() {
            let transport = MockTransport::new().submit_response(json!({"sha1": "abc"}));
            let service = service_with(transport.clone());

            let mut txn = Transaction::new();
            txn.begin(CommitId::new(SHA).unwrap()).unwrap();
            let mut props = Properties::new();
            props.insert("name".into(), json!("Ada"));
            txn.create("Person", props).unwrap();

            let meta = CommitMeta::new(
                RefName::new("refs/heads/master").unwrap(),
                "Ada <ada@example.org>",
                "add person",
            )
            .at(Timestamp::from_unix(1379698304).unwrap());

            let reply = service.commit_transaction(&mut txn, &meta).await.unwrap();
            assert_eq!(reply["sha1"], "abc");

            let submissions = transport.submissions();
            assert_eq!(submissions.len(), 1);
            assert_eq!(
                submissions[0].url,
                "http://store.example.org/transactions"
            );
            assert_eq!(submissions[0].content_type, "multipart/mixed");
        }
    }

    mod construction {
        use super::*;
        use crate::config::ClientConfig;

        #[test]
        fn from_config_requires_url() {
            let config = ClientConfig::default();
            assert!(Service::from_config(&config).is_err());

            let config = ClientConfig {
                url: Some("http://store.example.org".into()),
                ..ClientConfig::default()
            };
            let service = Service::from_config(&config).unwrap();
            assert_eq!(service.url(), "http://store.example.org");
        }

        #[test]
        fn debug_does_not_require_transport_debug() {
            let service = service_with(MockTransport::new());
            let rendered = format!("{service:?}");
            assert!(rendered.contains("mock"));
        }
    }
}
