//! File adapters around the core: CSV input and CSV/JSON/text output.

pub mod export;
pub mod source;
