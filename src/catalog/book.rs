//! Catalog entries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lending state of a book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    #[default]
    Available,
    Issued,
}

/// One title in the catalog, keyed by ISBN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub isbn: String,
    #[serde(default)]
    pub status: BookStatus,
}

impl Book {
    /// Creates an available book.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            status: BookStatus::Available,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == BookStatus::Available
    }

    /// Marks the book issued. Returns `false` if it already was.
    pub fn issue(&mut self) -> bool {
        if !self.is_available() {
            return false;
        }
        self.status = BookStatus::Issued;
        true
    }

    /// Marks the book available again. Returns `false` if it was not issued.
    pub fn return_book(&mut self) -> bool {
        if self.is_available() {
            return false;
        }
        self.status = BookStatus::Available;
        true
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self.status {
            BookStatus::Available => "available",
            BookStatus::Issued => "issued",
        };
        write!(
            f,
            "{} by {} (ISBN {}) [{status}]",
            self.title, self.author, self.isbn
        )
    }
}
