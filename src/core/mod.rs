//! core
//!
//! Core domain model: typed objects, schemas, and version history.
//!
//! # Modules
//!
//! - [`types`] - Strong types: CommitId, RefName, Timestamp
//! - [`schema`] - Property, class, and schema definitions
//! - [`object`] - Typed objects and their properties
//! - [`history`] - Commits and refs
//! - [`validate`] - Structural validation of objects against classes
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Parsing is permissive toward unknown wire fields and type tags
//! - Every parse produces a fresh, independently owned object graph

pub mod history;
pub mod object;
pub mod schema;
pub mod types;
pub mod validate;
