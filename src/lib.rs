//! Strata - a client for schema-typed, versioned object stores
//!
//! Strata is the client-side data model and transaction-encoding layer
//! for object stores with git-like versioning: refs point to commits,
//! and commits contain typed objects grouped into classes described by a
//! schema.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`core`] - Domain model: strong types, schemas, objects, history,
//!   and structural validation
//! - [`transaction`] - Atomic multi-action changesets and their
//!   multipart wire encoding
//! - [`transport`] - The only doorway to the network (HTTP and mock
//!   implementations behind one trait)
//! - [`service`] - High-level read operations and transaction submission
//!   against one store
//! - [`config`] - Client configuration
//!
//! # Correctness Invariants
//!
//! 1. Parsed values are immutable; every parse yields a fresh graph
//! 2. Wire parsing is permissive: unknown fields and unknown property
//!    types never fail a load
//! 3. Action logs are append-only with stable ids, and encode in append
//!    order
//! 4. A transaction submits at most once; failures surface verbatim
//!
//! # Example
//!
//! ```no_run
//! use strata::core::types::RefName;
//! use strata::service::Service;
//! use strata::transaction::{CommitMeta, Properties, Transaction};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = Service::over_http("http://store.example.org");
//!
//! let master = service.ref_named("master").await?;
//! let schema = service.schema(&master.head).await?;
//! println!("schema {} at {}", schema.name, master.head.sha1.short(7));
//!
//! let mut txn = Transaction::new();
//! txn.begin(master.head.sha1.clone())?;
//! let mut props = Properties::new();
//! props.insert("title".into(), "Lorem ipsum".into());
//! txn.create("issue", props)?;
//!
//! let meta = CommitMeta::new(
//!     RefName::new("refs/heads/master")?,
//!     "Ada <ada@example.org>",
//!     "file an issue",
//! );
//! service.commit_transaction(&mut txn, &meta).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod service;
pub mod transaction;
pub mod transport;
