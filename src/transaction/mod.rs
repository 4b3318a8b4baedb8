//! transaction
//!
//! Atomic multi-action changesets against a source commit.
//!
//! # Lifecycle
//!
//! A [`Transaction`] is an append-only log of create/update actions:
//!
//! 1. **Building** - [`begin`](Transaction::begin) names the source
//!    commit (re-settable until commit), then
//!    [`create`](Transaction::create) / [`update`](Transaction::update)
//!    append actions. Each append returns the action's stable zero-based
//!    id, so later actions can point at objects created earlier in the
//!    same uncommitted transaction. Actions are never removed, reordered,
//!    or renumbered.
//! 2. **Committing** - [`commit`](Transaction::commit) seals the log,
//!    encodes the multipart payload, and submits it once through the
//!    transport.
//! 3. **Done** / **Failed** - terminal. Transport failures surface
//!    verbatim; there is no retry and no partial application. A retry
//!    means a fresh transaction.
//!
//! A transaction is single-writer: one logical edit session, no internal
//! locking.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use strata::core::types::{CommitId, RefName};
//! use strata::transaction::{CommitMeta, Properties, Transaction};
//! use strata::transport::mock::MockTransport;
//!
//! # tokio_test::block_on(async {
//! let mut txn = Transaction::new();
//! txn.begin(CommitId::new("b51a382a91a29b41ea2e49e823b84b503cbe1f5f").unwrap())
//!     .unwrap();
//!
//! let mut props = Properties::new();
//! props.insert("name".into(), json!("Ada"));
//! let id = txn.create("Person", props).unwrap();
//! assert_eq!(id, 0);
//!
//! let meta = CommitMeta::new(
//!     RefName::new("refs/heads/master").unwrap(),
//!     "Ada <ada@example.org>",
//!     "add person",
//! );
//! let transport = MockTransport::new();
//! txn.commit(&meta, &transport, "http://store/transactions")
//!     .await
//!     .unwrap();
//! # });
//! ```

mod encode;

pub use encode::{Part, BOUNDARY, PART_CONTENT_TYPE, PAYLOAD_CONTENT_TYPE};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::core::types::{CommitId, RefName, Timestamp};
use crate::transport::{Transport, TransportError};

/// Property values for one create/update action, keyed by property name.
pub type Properties = serde_json::Map<String, Value>;

/// Errors from the transaction lifecycle.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// An operation was attempted in a state that forbids it (append
    /// before `begin`, anything after `commit`).
    #[error("invalid transaction state: {0}")]
    InvalidState(String),

    /// The payload could not be encoded.
    #[error("transaction payload could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    /// The transport reported a failure; surfaced unmodified.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Lifecycle state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Accepting `begin` and action appends.
    Building,
    /// Sealed; the payload is being submitted.
    Committing,
    /// Submitted and acknowledged.
    Done,
    /// Submission failed; the transaction is not reusable.
    Failed,
}

impl std::fmt::Display for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionState::Building => write!(f, "building"),
            TransactionState::Committing => write!(f, "committing"),
            TransactionState::Done => write!(f, "done"),
            TransactionState::Failed => write!(f, "failed"),
        }
    }
}

/// One appended action. `id` is the action's zero-based position in the
/// log at append time, stable for the life of the transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Create a new object of a class.
    Create {
        id: usize,
        klass: String,
        properties: Properties,
    },
    /// Update an existing object by uuid.
    Update {
        id: usize,
        uuid: String,
        properties: Properties,
    },
}

impl Action {
    /// The action's stable zero-based id.
    pub fn id(&self) -> usize {
        match self {
            Action::Create { id, .. } | Action::Update { id, .. } => *id,
        }
    }
}

/// Commit metadata for sealing a transaction.
///
/// The author doubles as committer and one timestamp covers both dates;
/// distinct committer identity is not supported by this layer.
#[derive(Debug, Clone)]
pub struct CommitMeta {
    /// The ref the resulting commit should advance.
    pub target: RefName,
    /// Author (and committer) identity.
    pub author: String,
    /// Commit message.
    pub message: String,
    /// Timestamp for both author and committer dates.
    pub timestamp: Timestamp,
}

impl CommitMeta {
    /// Create commit metadata stamped with the current time.
    pub fn new(target: RefName, author: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target,
            author: author.into(),
            message: message.into(),
            timestamp: Timestamp::now(),
        }
    }

    /// Replace the timestamp (deterministic payloads for tests).
    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// An atomic changeset under construction.
#[derive(Debug)]
pub struct Transaction {
    /// Client-side id, for logs only; never sent to the server.
    id: String,
    source: Option<CommitId>,
    actions: Vec<Action>,
    state: TransactionState,
}

impl Transaction {
    /// Create an empty transaction in the building state.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source: None,
            actions: Vec::new(),
            state: TransactionState::Building,
        }
    }

    /// The client-side transaction id used in logs.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// The source commit, once `begin` has been called.
    pub fn source(&self) -> Option<&CommitId> {
        self.source.as_ref()
    }

    /// The appended actions, in append order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Name the source commit the changeset applies to.
    ///
    /// Must precede any action append. Calling it again before commit
    /// re-sets the source; after commit it is invalid.
    pub fn begin(&mut self, source: CommitId) -> Result<(), TransactionError> {
        if self.state != TransactionState::Building {
            return Err(TransactionError::InvalidState(format!(
                "begin on a {} transaction",
                self.state
            )));
        }
        self.source = Some(source);
        Ok(())
    }

    /// Append a create action. Returns the action's stable id.
    pub fn create(
        &mut self,
        klass: impl Into<String>,
        properties: Properties,
    ) -> Result<usize, TransactionError> {
        self.ensure_appendable("create")?;
        let id = self.actions.len();
        self.actions.push(Action::Create {
            id,
            klass: klass.into(),
            properties,
        });
        Ok(id)
    }

    /// Append an update action against an existing object. Returns the
    /// action's stable id.
    pub fn update(
        &mut self,
        uuid: impl Into<String>,
        properties: Properties,
    ) -> Result<usize, TransactionError> {
        self.ensure_appendable("update")?;
        let id = self.actions.len();
        self.actions.push(Action::Update {
            id,
            uuid: uuid.into(),
            properties,
        });
        Ok(id)
    }

    fn ensure_appendable(&self, operation: &str) -> Result<(), TransactionError> {
        if self.state != TransactionState::Building {
            return Err(TransactionError::InvalidState(format!(
                "{operation} on a {} transaction",
                self.state
            )));
        }
        if self.source.is_none() {
            return Err(TransactionError::InvalidState(format!(
                "{operation} before begin"
            )));
        }
        Ok(())
    }

    /// The payload parts: begin, the actions in append order, commit.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when `begin` has not been called.
    pub fn parts(&self, meta: &CommitMeta) -> Result<Vec<Part>, TransactionError> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| TransactionError::InvalidState("encode before begin".into()))?;

        let mut parts = Vec::with_capacity(self.actions.len() + 2);
        parts.push(encode::begin_part(source)?);
        for action in &self.actions {
            parts.push(encode::action_part(action)?);
        }
        parts.push(encode::commit_part(meta)?);
        Ok(parts)
    }

    /// Render the complete multipart payload.
    pub fn encode(&self, meta: &CommitMeta) -> Result<String, TransactionError> {
        Ok(encode::render_payload(&self.parts(meta)?))
    }

    /// Seal the transaction, encode it, and submit it once.
    ///
    /// On transport success the transaction is `Done` and the server's
    /// reply (the new commit/ref state) is returned; on failure it is
    /// `Failed` and the transport error is surfaced verbatim. Either way
    /// the transaction is finished: a second `commit` is
    /// `InvalidState` and performs no network submission.
    pub async fn commit(
        &mut self,
        meta: &CommitMeta,
        transport: &dyn Transport,
        url: &str,
    ) -> Result<Value, TransactionError> {
        if self.state != TransactionState::Building {
            return Err(TransactionError::InvalidState(format!(
                "commit on a {} transaction",
                self.state
            )));
        }
        if self.source.is_none() {
            return Err(TransactionError::InvalidState("commit before begin".into()));
        }
        let payload = self.encode(meta)?;
        self.state = TransactionState::Committing;

        debug!(
            transaction = %self.id,
            actions = self.actions.len(),
            target = %meta.target,
            "submitting transaction"
        );

        match transport.submit(url, &payload, PAYLOAD_CONTENT_TYPE).await {
            Ok(reply) => {
                self.state = TransactionState::Done;
                Ok(reply)
            }
            Err(e) => {
                self.state = TransactionState::Failed;
                debug!(transaction = %self.id, error = %e, "transaction failed");
                Err(TransactionError::Transport(e))
            }
        }
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}
