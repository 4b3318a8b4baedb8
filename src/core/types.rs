//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`CommitId`] - Validated commit identifier (hex SHA)
//! - [`RefName`] - Validated ref name (branch/tag pointer)
//! - [`Timestamp`] - UTC instant in the store's commit-date wire format
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use strata::core::types::{CommitId, RefName};
//!
//! // Valid constructions
//! let sha = CommitId::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! let refname = RefName::new("refs/heads/master").unwrap();
//!
//! // Invalid constructions fail at creation time
//! assert!(CommitId::new("not-a-sha").is_err());
//! assert!(RefName::new("refs/heads/bad..name").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid commit id: {0}")]
    InvalidCommitId(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),

    #[error("timestamp out of range: {0}")]
    TimestampOutOfRange(i64),
}

/// A validated commit identifier.
///
/// Commit ids are hex SHAs (40 characters for SHA-1, 64 for SHA-256),
/// normalized to lowercase.
///
/// # Example
///
/// ```
/// use strata::core::types::CommitId;
///
/// let id = CommitId::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(id.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(id.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitId(String);

impl CommitId {
    /// Create a new validated commit id, normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidCommitId` if the string is not a
    /// 40- or 64-character hex SHA.
    pub fn new(sha: impl Into<String>) -> Result<Self, TypeError> {
        let sha = sha.into().to_ascii_lowercase();
        if sha.len() != 40 && sha.len() != 64 {
            return Err(TypeError::InvalidCommitId(format!(
                "expected 40 or 64 hex characters, got {}",
                sha.len()
            )));
        }
        if !sha.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidCommitId(
                "commit id must be hexadecimal".into(),
            ));
        }
        Ok(Self(sha))
    }

    /// Get an abbreviated form (the first `len` characters).
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Get the commit id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommitId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CommitId> for String {
    fn from(id: CommitId) -> Self {
        id.0
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated ref name.
///
/// Refs are named pointers to commits, e.g. `refs/heads/master` or `HEAD`.
/// Names must conform to the usual refname rules: no empty names, no
/// leading or trailing `/`, no `..`, `//`, `@{`, no `.lock` suffix, and
/// none of the characters git forbids in refnames.
///
/// # Example
///
/// ```
/// use strata::core::types::RefName;
///
/// let name = RefName::new("refs/heads/master").unwrap();
/// assert_eq!(name.as_str(), "refs/heads/master");
///
/// assert!(RefName::new("").is_err());
/// assert!(RefName::new("refs//heads").is_err());
/// assert!(RefName::new("refs/heads/x.lock").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefName(String);

impl RefName {
    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if the name violates refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Create a branch ref name (`refs/heads/<branch>`).
    ///
    /// # Example
    ///
    /// ```
    /// use strata::core::types::RefName;
    ///
    /// let name = RefName::for_branch("master").unwrap();
    /// assert_eq!(name.as_str(), "refs/heads/master");
    /// ```
    pub fn for_branch(branch: &str) -> Result<Self, TypeError> {
        Self::new(format!("refs/heads/{branch}"))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        let err = |msg: &str| Err(TypeError::InvalidRefName(msg.into()));

        if name.is_empty() {
            return err("ref name cannot be empty");
        }
        if name.starts_with('/') || name.ends_with('/') {
            return err("ref name cannot start or end with '/'");
        }
        if name.ends_with(".lock") {
            return err("ref name cannot end with '.lock'");
        }
        for pattern in ["..", "//", "@{"] {
            if name.contains(pattern) {
                return Err(TypeError::InvalidRefName(format!(
                    "ref name cannot contain '{pattern}'"
                )));
            }
        }
        for c in name.chars() {
            if c.is_ascii_control() || [' ', '~', '^', ':', '\\', '?', '*', '['].contains(&c) {
                return err("ref name contains a forbidden character");
            }
        }
        for component in name.split('/') {
            if component.starts_with('.') {
                return err("path component cannot start with '.'");
            }
        }
        Ok(())
    }

    /// Strip a prefix from the ref name and return the remainder.
    pub fn strip_prefix(&self, prefix: &str) -> Option<&str> {
        self.0.strip_prefix(prefix)
    }

    /// Get the ref name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RefName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RefName> for String {
    fn from(name: RefName) -> Self {
        name.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A UTC instant rendered in the store's commit-date wire format:
/// whole seconds since the epoch, a space, and the literal zone
/// offset `+0000`.
///
/// # Example
///
/// ```
/// use strata::core::types::Timestamp;
///
/// let ts = Timestamp::from_unix(1379698304).unwrap();
/// assert_eq!(ts.to_wire(), "1379698304 +0000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(chrono::DateTime<chrono::Utc>);

impl Timestamp {
    /// The current moment.
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }

    /// Create a timestamp from whole seconds since the epoch.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::TimestampOutOfRange` for values chrono cannot
    /// represent.
    pub fn from_unix(secs: i64) -> Result<Self, TypeError> {
        chrono::DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or(TypeError::TimestampOutOfRange(secs))
    }

    /// Whole seconds since the epoch.
    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render in the wire format (`"<seconds> +0000"`).
    pub fn to_wire(&self) -> String {
        format!("{} +0000", self.0.timestamp())
    }

    /// Get the underlying datetime.
    pub fn as_datetime(&self) -> &chrono::DateTime<chrono::Utc> {
        &self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_wire())
    }
}
