//! Crate-wide error type.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Coarse classification of an [`Error`], used by callers that only care
/// whether a row was bad or the whole run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A single malformed row or field. Callers skip it and continue.
    InvalidInput,
    /// No readings at all. Aggregation still yields an empty report.
    EmptyDataset,
    /// Filesystem or CSV/JSON codec failure.
    Io,
    /// Invalid configuration.
    Config,
    /// Catalog operation rejected.
    Catalog,
}

/// Errors produced by the reading store, loaders, exporters and catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid timestamp \"{0}\"")]
    InvalidTimestamp(String),

    #[error("invalid value \"{0}\": not a finite number")]
    InvalidValue(String),

    #[error("missing value")]
    MissingValue,

    #[error("empty entity name")]
    EmptyEntity,

    #[error("column \"{column}\" not found in {}", .path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("no readings in dataset")]
    EmptyDataset,

    #[error("isbn {0} already in catalog")]
    DuplicateIsbn(String),

    #[error("isbn {0} not found")]
    BookNotFound(String),

    #[error("isbn {0} is already issued")]
    AlreadyIssued(String),

    #[error("isbn {0} is not issued")]
    NotIssued(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTimestamp(_)
            | Self::InvalidValue(_)
            | Self::MissingValue
            | Self::EmptyEntity
            | Self::MissingColumn { .. } => ErrorKind::InvalidInput,
            Self::EmptyDataset => ErrorKind::EmptyDataset,
            Self::DuplicateIsbn(_)
            | Self::BookNotFound(_)
            | Self::AlreadyIssued(_)
            | Self::NotIssued(_) => ErrorKind::Catalog,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) | Self::Csv(_) | Self::Json(_) => ErrorKind::Io,
        }
    }
}

/// Result alias using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_errors_are_invalid_input() {
        assert_eq!(
            Error::InvalidTimestamp("x".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(Error::InvalidValue("x".into()).kind(), ErrorKind::InvalidInput);
        assert_eq!(Error::MissingValue.kind(), ErrorKind::InvalidInput);
        assert_eq!(Error::EmptyEntity.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn empty_dataset_kind() {
        assert_eq!(Error::EmptyDataset.kind(), ErrorKind::EmptyDataset);
    }

    #[test]
    fn display_includes_offending_text() {
        let msg = Error::InvalidValue("abc".into()).to_string();
        assert!(msg.contains("abc"));
    }
}
