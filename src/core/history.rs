//! core::history
//!
//! Version-control metadata: commits and the refs that point at them.
//!
//! Both types are parsed from wire JSON and treated as immutable
//! afterwards; the transaction layer consumes them, it never mutates
//! them. The service a commit was fetched from is not stored on the
//! commit — callers keep the [`Service`](crate::service::Service) handle
//! they already hold and pass the commit back to it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::types::CommitId;

/// Errors from history parsing.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The payload does not have the expected JSON shape.
    #[error("malformed history payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// An immutable commit: one version of the store's content.
///
/// Dates are kept in their wire form (`"<seconds> <zone>"`); they are
/// opaque to this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    /// The commit SHA1.
    pub sha1: CommitId,
    /// The author of the commit.
    pub author: String,
    /// The date the commit was authored.
    #[serde(rename = "author-date")]
    pub author_date: String,
    /// The person who created the commit.
    pub committer: String,
    /// The date the commit was created.
    #[serde(rename = "committer-date")]
    pub committer_date: String,
    /// Parent commit SHA1s, oldest first.
    #[serde(default)]
    pub parents: Vec<CommitId>,
    /// The commit subject line.
    pub subject: String,
}

impl Commit {
    /// Parse a commit from its wire record.
    pub fn from_wire(value: &Value) -> Result<Self, HistoryError> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Pretty-printed JSON representation.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// A ref: a named pointer (branch or tag) to its head commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ref {
    /// The ref type, usually `"branch"` or `"tag"`.
    #[serde(rename = "type")]
    pub ref_type: String,
    /// URL aliases under which the ref is reachable.
    #[serde(default, rename = "url-aliases")]
    pub url_aliases: Vec<String>,
    /// The latest commit in the ref.
    pub head: Commit,
}

impl Ref {
    /// Parse a ref from its wire record.
    pub fn from_wire(value: &Value) -> Result<Self, HistoryError> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Pretty-printed JSON representation.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
