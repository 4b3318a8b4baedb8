//! transport
//!
//! The crate's only doorway to the network.
//!
//! # Architecture
//!
//! The `Transport` trait carries exactly two operations: fetch a JSON
//! document, and submit an encoded body. Everything above it (URL
//! construction, wire parsing, transaction encoding) is pure data work,
//! which keeps the network seam narrow and swappable.
//!
//! # Modules
//!
//! - `traits`: Core `Transport` trait and `TransportError`
//! - [`http`]: HTTP implementation backed by `reqwest`
//! - [`mock`]: Mock implementation for deterministic testing

pub mod http;
pub mod mock;
mod traits;

pub use traits::{Transport, TransportError};
