//! Book library for the page source
//!
//! Books live in a directory as `<id>.json` (pre-parsed documents) or
//! `<id>.txt` (plain text, parsed on first load). Loaded books are kept in
//! memory together with their page layout.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::import::parse_text;
use super::layout::{locate_chapters, render_page, total_pages};
use super::types::{BookSummary, LoadedBook, StoredBook};
use super::LibraryError;
use crate::document::BookDocument;

/// Thread-safe book library
#[derive(Clone)]
pub struct LibraryStore {
    root: PathBuf,
    sentences_per_page: usize,
    books: Arc<RwLock<HashMap<String, Arc<LoadedBook>>>>,
}

impl LibraryStore {
    pub fn new(root: impl Into<PathBuf>, sentences_per_page: usize) -> Self {
        Self {
            root: root.into(),
            sentences_per_page: sentences_per_page.max(1),
            books: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Serve one page of a book, clamping the index into the book
    pub async fn page(&self, book_id: &str, page: u32) -> Result<BookDocument, LibraryError> {
        let book = self.get(book_id).await?;
        Ok(render_page(&book, page, self.sentences_per_page))
    }

    /// Add a parsed book directly, bypassing the directory
    pub async fn insert(&self, book_id: &str, book: StoredBook) -> Arc<LoadedBook> {
        let loaded = Arc::new(self.layout(book_id, book));
        self.books
            .write()
            .await
            .insert(book_id.to_string(), Arc::clone(&loaded));
        loaded
    }

    /// Loaded book, reading it from disk on first use
    pub async fn get(&self, book_id: &str) -> Result<Arc<LoadedBook>, LibraryError> {
        if let Some(book) = self.books.read().await.get(book_id) {
            return Ok(Arc::clone(book));
        }

        let path = self
            .locate(book_id)
            .ok_or_else(|| LibraryError::NotFound(book_id.to_string()))?;

        let book = read_book(&path, book_id).await?;
        tracing::info!(
            "Loaded book '{}' ({} sentences) from {}",
            book.title,
            book.sentences.len(),
            path.display()
        );

        Ok(self.insert(book_id, book).await)
    }

    /// All books in memory or in the library directory
    pub async fn list(&self) -> Result<Vec<BookSummary>, LibraryError> {
        let mut summaries: HashMap<String, BookSummary> = self
            .books
            .read()
            .await
            .values()
            .map(|b| {
                (
                    b.id.clone(),
                    BookSummary {
                        id: b.id.clone(),
                        title: b.book.title.clone(),
                    },
                )
            })
            .collect();

        if self.root.is_dir() {
            let mut entries = tokio::fs::read_dir(&self.root).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let Some(id) = book_id_of(&path) else {
                    continue;
                };
                if summaries.contains_key(&id) {
                    continue;
                }
                match self.get(&id).await {
                    Ok(book) => {
                        summaries.insert(
                            id.clone(),
                            BookSummary {
                                id,
                                title: book.book.title.clone(),
                            },
                        );
                    }
                    Err(e) => tracing::warn!("Skipping unreadable book {}: {}", path.display(), e),
                }
            }
        }

        let mut list: Vec<BookSummary> = summaries.into_values().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(list)
    }

    fn layout(&self, book_id: &str, book: StoredBook) -> LoadedBook {
        let chapters = locate_chapters(&book.table_of_content, &book.sentences, self.sentences_per_page);
        let total_pages = total_pages(book.sentences.len(), self.sentences_per_page);

        LoadedBook {
            id: book_id.to_string(),
            book,
            chapters,
            total_pages,
        }
    }

    /// Path of a book file; ids that could escape the root are rejected
    fn locate(&self, book_id: &str) -> Option<PathBuf> {
        if book_id.is_empty()
            || book_id.starts_with('.')
            || book_id.contains(['/', '\\'])
        {
            return None;
        }

        ["json", "txt"]
            .iter()
            .map(|ext| self.root.join(format!("{}.{}", book_id, ext)))
            .find(|p| p.is_file())
    }
}

fn book_id_of(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if ext != "json" && ext != "txt" {
        return None;
    }
    path.file_stem()?.to_str().map(str::to_string)
}

async fn read_book(path: &Path, book_id: &str) -> Result<StoredBook, LibraryError> {
    let raw = tokio::fs::read_to_string(path).await?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => {
            serde_json::from_str(&raw).map_err(|e| LibraryError::Parse(format!("{}: {}", book_id, e)))
        }
        _ => {
            let title = raw
                .lines()
                .find_map(|l| l.trim().strip_prefix("Title:").map(|t| t.trim().to_string()))
                .unwrap_or_else(|| book_id.replace('_', " "));
            parse_text(&raw, &title)
        }
    }
}
