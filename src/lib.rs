//! Aggregation of time-stamped readings per entity and per time bucket,
//! plus a small JSON-backed library catalog.

/// Per-entity, per-bucket and descriptive aggregates.
pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod error;
/// CSV loading and CSV/JSON/text export.
pub mod io;
pub mod reading;
pub mod report;

pub use error::{Error, ErrorKind, Result};
