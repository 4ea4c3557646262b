//! Book-open session
//!
//! Wires the reconciler, the resume prompt and the pagination engine into
//! the flow a reader goes through when opening a book:
//!
//! 1. Resolve the saved position once (remote only when authenticated)
//! 2. Evaluate the resume offer
//! 3. Fetch page 0
//! 4. On accept fetch the offered page; on decline persist page 0

use std::sync::Arc;

use thiserror::Error;

use super::auth::AuthSignal;
use super::pagination::PaginationEngine;
use super::prompt::{ContinuePrompt, PromptError};
use super::source::{PageError, PageSource};
use crate::document::{BookDocument, Paragraph};
use crate::progress::{Persisted, ProgressReconciler, ResolvedPosition};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Page(#[from] PageError),
}

/// One open book
pub struct ReaderSession {
    book_id: String,
    reconciler: ProgressReconciler,
    auth: Arc<dyn AuthSignal>,
    engine: PaginationEngine,
    prompt: ContinuePrompt,
    resolved: Option<ResolvedPosition>,
}

impl ReaderSession {
    /// Open a book: resolve the saved position, set up the offer and load page 0
    pub async fn open(
        book_id: &str,
        source: Arc<dyn PageSource>,
        reconciler: ProgressReconciler,
        auth: Arc<dyn AuthSignal>,
    ) -> Result<Self, PageError> {
        let resolved = reconciler.resolve(book_id, auth.is_authenticated()).await;

        let mut prompt = ContinuePrompt::new();
        if prompt.evaluate(resolved.as_ref()) {
            tracing::info!(
                "Offering to resume book {} at page {}",
                book_id,
                prompt.offered_page().unwrap_or_default()
            );
        }

        let engine = PaginationEngine::new(book_id, source)
            .with_progress(reconciler.clone(), Arc::clone(&auth));

        if let Err(e) = engine.fetch_page(0).await {
            tracing::error!("Failed to load book {}: {}", book_id, e);
            return Err(e);
        }

        Ok(Self {
            book_id: book_id.to_string(),
            reconciler,
            auth,
            engine,
            prompt,
            resolved,
        })
    }

    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    pub fn prompt(&self) -> &ContinuePrompt {
        &self.prompt
    }

    /// Position resolved when the book was opened
    pub fn resolved(&self) -> Option<&ResolvedPosition> {
        self.resolved.as_ref()
    }

    pub fn engine(&self) -> &PaginationEngine {
        &self.engine
    }

    /// Resume from the offered page
    pub async fn accept_offer(&mut self) -> Result<BookDocument, SessionError> {
        let page = self.prompt.accept()?;
        Ok(self.goto_page(page).await?)
    }

    /// Stay on page 0 and record the reset in every eligible store
    pub fn decline_offer(&mut self) -> Result<Persisted, PromptError> {
        self.prompt.decline()?;

        let title = self
            .engine
            .current()
            .map(|d| d.title)
            .or_else(|| self.resolved.as_ref().map(|r| r.title.clone()))
            .unwrap_or_default();

        Ok(self
            .reconciler
            .persist(&self.book_id, 0, &title, self.auth.is_authenticated()))
    }

    pub async fn goto_page(&self, page: u32) -> Result<BookDocument, PageError> {
        self.engine.fetch_page(page).await.map_err(|e| {
            tracing::error!("Failed to load page {} of book {}: {}", page, self.book_id, e);
            e
        })
    }

    /// Advance one page; `None` when already on the last page
    pub async fn next_page(&self) -> Result<Option<BookDocument>, PageError> {
        match self.engine.current_page() {
            Some(page) if self.engine.has_next() => self.goto_page(page + 1).await.map(Some),
            _ => Ok(None),
        }
    }

    /// Go back one page; `None` when already on the first page
    pub async fn previous_page(&self) -> Result<Option<BookDocument>, PageError> {
        match self.engine.current_page() {
            Some(page) if self.engine.has_previous() => self.goto_page(page - 1).await.map(Some),
            _ => Ok(None),
        }
    }

    /// Jump to the first page of a chapter
    pub async fn goto_chapter(&self, chapter_index: usize) -> Result<Option<BookDocument>, PageError> {
        match self.engine.chapter_pages(chapter_index).first() {
            Some(&page) => self.goto_page(page).await.map(Some),
            None => Ok(None),
        }
    }

    pub fn current(&self) -> Option<BookDocument> {
        self.engine.current()
    }

    pub fn chapter_pages(&self, chapter_index: usize) -> Vec<u32> {
        self.engine.chapter_pages(chapter_index)
    }

    pub fn paragraphs(&self) -> Vec<Paragraph> {
        self.engine.paragraphs()
    }

    pub fn progress_fraction(&self) -> Option<f64> {
        self.engine.current().map(|d| d.progress_fraction())
    }

    pub fn is_loading(&self) -> bool {
        self.engine.is_loading()
    }
}
