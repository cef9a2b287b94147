//! Readings and the append-only store that holds them.

pub mod store;
pub mod types;

pub use store::{IngestReport, MissingValuePolicy, RawRow, ReadingStore, RowIssue};
pub use types::{Reading, TIMESTAMP_FORMAT, is_missing, parse_timestamp, parse_value};
