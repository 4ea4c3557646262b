//! Book library
//!
//! Loads books from the library directory, lays them out into pages and
//! serves single pages to readers.

mod import;
mod layout;
mod store;
mod types;

use thiserror::Error;

pub use import::parse_text;
pub use layout::{locate_chapters, render_page, total_pages};
pub use store::LibraryStore;
pub use types::{BookSummary, LoadedBook, StoredBook, StoredSentence, TocEntry};

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Book not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse book: {0}")]
    Parse(String),
}
