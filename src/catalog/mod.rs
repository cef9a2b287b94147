//! JSON-backed library catalog with explicit write transactions.

pub mod book;
pub mod store;

pub use book::{Book, BookStatus};
pub use store::{Catalog, Transaction};
