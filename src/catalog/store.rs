//! The catalog file and its transactions.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::book::Book;
use crate::error::{Error, Result};

/// In-memory catalog bound to a JSON file.
///
/// Reads go straight to the loaded books. Writes are staged in a
/// [`Transaction`] and reach the file once, on [`Transaction::commit`].
#[derive(Debug)]
pub struct Catalog {
    path: PathBuf,
    books: Vec<Book>,
}

impl Catalog {
    /// Opens the catalog at `path`.
    ///
    /// A missing or blank file yields an empty catalog; nothing is written
    /// until the first commit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file exists but cannot be read and
    /// [`Error::Json`] if it is not a valid book list.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let books = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            debug!(path = %path.display(), "catalog file absent, starting empty");
            Vec::new()
        };
        Ok(Self { path, books })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All books in insertion order.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn find_by_isbn(&self, isbn: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.isbn == isbn)
    }

    /// Books whose title contains `query`, ignoring case.
    pub fn search_by_title(&self, query: &str) -> Vec<&Book> {
        let query = query.to_lowercase();
        self.books
            .iter()
            .filter(|b| b.title.to_lowercase().contains(&query))
            .collect()
    }

    /// Starts a transaction over a working copy of the books.
    ///
    /// Dropping the transaction without committing discards its changes.
    pub fn transaction(&mut self) -> Transaction<'_> {
        let books = self.books.clone();
        Transaction {
            catalog: self,
            books,
            changes: 0,
        }
    }

    fn write_file(&self, books: &[Book]) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        let written = write_books(&tmp, books)
            .and_then(|()| fs::rename(&tmp, &self.path).map_err(Error::from));
        if written.is_err() && tmp.exists() {
            if let Err(e) = fs::remove_file(&tmp) {
                warn!(path = %tmp.display(), error = %e, "temporary catalog file left behind");
            }
        }
        written
    }
}

fn write_books(path: &Path, books: &[Book]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, books)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// A batch of catalog mutations flushed with a single write.
#[derive(Debug)]
pub struct Transaction<'a> {
    catalog: &'a mut Catalog,
    books: Vec<Book>,
    changes: usize,
}

impl Transaction<'_> {
    /// Books as they will be after commit.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Adds a book.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateIsbn`] if the ISBN is already present.
    pub fn add(&mut self, book: Book) -> Result<()> {
        if self.books.iter().any(|b| b.isbn == book.isbn) {
            return Err(Error::DuplicateIsbn(book.isbn));
        }
        self.books.push(book);
        self.changes += 1;
        Ok(())
    }

    /// Issues the book with `isbn`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BookNotFound`] or [`Error::AlreadyIssued`].
    pub fn issue(&mut self, isbn: &str) -> Result<()> {
        if !self.find_mut(isbn)?.issue() {
            return Err(Error::AlreadyIssued(isbn.to_string()));
        }
        self.changes += 1;
        Ok(())
    }

    /// Returns the book with `isbn` to the shelf.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BookNotFound`] or [`Error::NotIssued`].
    pub fn return_book(&mut self, isbn: &str) -> Result<()> {
        if !self.find_mut(isbn)?.return_book() {
            return Err(Error::NotIssued(isbn.to_string()));
        }
        self.changes += 1;
        Ok(())
    }

    /// Writes the staged books once and makes them the catalog's state.
    ///
    /// Returns the number of applied changes. A transaction without changes
    /// does not touch the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written; the catalog keeps its
    /// previous state in that case.
    pub fn commit(self) -> Result<usize> {
        if self.changes == 0 {
            return Ok(0);
        }
        self.catalog.write_file(&self.books)?;
        self.catalog.books = self.books;
        info!(
            path = %self.catalog.path.display(),
            changes = self.changes,
            books = self.catalog.books.len(),
            "catalog committed"
        );
        Ok(self.changes)
    }

    fn find_mut(&mut self, isbn: &str) -> Result<&mut Book> {
        self.books
            .iter_mut()
            .find(|b| b.isbn == isbn)
            .ok_or_else(|| Error::BookNotFound(isbn.to_string()))
    }
}
