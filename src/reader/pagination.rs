//! Pagination engine
//!
//! Single source of truth for the page currently shown. Each fetch replaces
//! the held page entirely. Fetches are independent tasks: when two overlap,
//! whichever response lands last becomes the current page.

use std::sync::Arc;

use parking_lot::Mutex;

use super::auth::AuthSignal;
use super::source::{PageError, PageSource};
use crate::document::{BookDocument, Paragraph};
use crate::progress::ProgressReconciler;

#[derive(Default)]
struct EngineState {
    current: Option<BookDocument>,
    /// Set once any fetch has succeeded
    landed: bool,
    in_flight: usize,
    last_error: Option<String>,
}

/// Writes each newly landed page through the reconciler
#[derive(Clone)]
struct ProgressHook {
    reconciler: ProgressReconciler,
    auth: Arc<dyn AuthSignal>,
}

/// Page fetching and current-page state for one open book
#[derive(Clone)]
pub struct PaginationEngine {
    book_id: String,
    source: Arc<dyn PageSource>,
    progress: Option<ProgressHook>,
    state: Arc<Mutex<EngineState>>,
}

/// Decrements the in-flight counter even if the fetch future is dropped
struct InFlight(Arc<Mutex<EngineState>>);

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut state = self.0.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

impl PaginationEngine {
    pub fn new(book_id: &str, source: Arc<dyn PageSource>) -> Self {
        Self {
            book_id: book_id.to_string(),
            source,
            progress: None,
            state: Arc::new(Mutex::new(EngineState::default())),
        }
    }

    /// Persist every page that lands after the first successful fetch
    pub fn with_progress(mut self, reconciler: ProgressReconciler, auth: Arc<dyn AuthSignal>) -> Self {
        self.progress = Some(ProgressHook { reconciler, auth });
        self
    }

    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    /// Fetch a page and make it current.
    ///
    /// The index is passed through unclamped; callers check `has_previous`
    /// and `has_next` first. Errors leave the previous page in place and are
    /// recorded as the blocking error state.
    pub async fn fetch_page(&self, page_index: u32) -> Result<BookDocument, PageError> {
        self.state.lock().in_flight += 1;
        let _in_flight = InFlight(Arc::clone(&self.state));

        tracing::debug!("Fetching page {} of book {}", page_index, self.book_id);

        let doc = match self.source.fetch(&self.book_id, page_index).await {
            Ok(doc) => doc,
            Err(e) => {
                self.state.lock().last_error = Some(e.to_string());
                return Err(e);
            }
        };

        let initial = {
            let mut state = self.state.lock();
            let initial = !state.landed;
            state.landed = true;
            state.current = Some(doc.clone());
            state.last_error = None;
            initial
        };

        if !initial {
            if let Some(hook) = &self.progress {
                // Remote write stays detached
                hook.reconciler.persist(
                    &self.book_id,
                    doc.current_page,
                    &doc.title,
                    hook.auth.is_authenticated(),
                );
            }
        }

        Ok(doc)
    }

    /// Snapshot of the page currently held
    pub fn current(&self) -> Option<BookDocument> {
        self.state.lock().current.clone()
    }

    pub fn current_page(&self) -> Option<u32> {
        self.state.lock().current.as_ref().map(|d| d.current_page)
    }

    pub fn has_previous(&self) -> bool {
        self.state
            .lock()
            .current
            .as_ref()
            .is_some_and(|d| d.has_previous)
    }

    pub fn has_next(&self) -> bool {
        self.state.lock().current.as_ref().is_some_and(|d| d.has_next)
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().in_flight > 0
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.lock().last_error.clone()
    }

    pub fn chapter_pages(&self, chapter_index: usize) -> Vec<u32> {
        self.state
            .lock()
            .current
            .as_ref()
            .map(|d| d.chapter_pages(chapter_index))
            .unwrap_or_default()
    }

    pub fn paragraphs(&self) -> Vec<Paragraph> {
        self.state
            .lock()
            .current
            .as_ref()
            .map(|d| d.paragraphs())
            .unwrap_or_default()
    }
}
