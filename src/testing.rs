//! In-memory collaborators for unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::document::{BookDocument, Chapter, Sentence};
use crate::progress::{CacheError, LocalCache, ProgressRecord, RemoteError, RemoteStore};
use crate::reader::{PageError, PageSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteMode {
    Healthy,
    Unauthorized,
    Failing,
}

pub struct FakeRemote {
    records: Mutex<HashMap<String, ProgressRecord>>,
    mode: Mutex<RemoteMode>,
    calls: AtomicUsize,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            mode: Mutex::new(RemoteMode::Healthy),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_mode(&self, mode: RemoteMode) {
        *self.mode.lock() = mode;
    }

    pub fn insert(&self, record: ProgressRecord) {
        self.records.lock().insert(record.book_id.clone(), record);
    }

    pub fn record(&self, book_id: &str) -> Option<ProgressRecord> {
        self.records.lock().get(book_id).cloned()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match *self.mode.lock() {
            RemoteMode::Healthy => Ok(()),
            RemoteMode::Unauthorized => Err(RemoteError::Unauthorized),
            RemoteMode::Failing => Err(RemoteError::Transport("connection reset".to_string())),
        }
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn get(&self, book_id: &str) -> Result<ProgressRecord, RemoteError> {
        self.check()?;
        self.record(book_id)
            .ok_or_else(|| RemoteError::NotFound(book_id.to_string()))
    }

    async fn set(&self, book_id: &str, page: u32, title: &str) -> Result<(), RemoteError> {
        self.check()?;
        self.insert(ProgressRecord::now(book_id, page, title));
        Ok(())
    }
}

/// Cache whose storage is always unreadable
pub struct FailingCache;

impl LocalCache for FailingCache {
    fn get(&self, _book_id: &str) -> Result<Option<ProgressRecord>, CacheError> {
        Err(CacheError::Corrupt("unexpected end of input".to_string()))
    }

    fn set(&self, _book_id: &str, _record: &ProgressRecord) -> Result<(), CacheError> {
        Err(CacheError::Corrupt("unexpected end of input".to_string()))
    }
}

/// Page source serving a synthetic book with two sentences per page
pub struct FakePages {
    title: String,
    total_pages: u32,
    chapters: Vec<Chapter>,
    delays: Mutex<HashMap<u32, Duration>>,
    failing: Mutex<bool>,
    fetched: Mutex<Vec<u32>>,
}

impl FakePages {
    pub fn new(title: &str, total_pages: u32, chapters: Vec<Chapter>) -> Self {
        Self {
            title: title.to_string(),
            total_pages,
            chapters,
            delays: Mutex::new(HashMap::new()),
            failing: Mutex::new(false),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn delay(&self, page: u32, delay: Duration) {
        self.delays.lock().insert(page, delay);
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    pub fn fetched(&self) -> Vec<u32> {
        self.fetched.lock().clone()
    }
}

#[async_trait]
impl PageSource for FakePages {
    async fn fetch(&self, book_id: &str, page_index: u32) -> Result<BookDocument, PageError> {
        self.fetched.lock().push(page_index);

        let delay = self.delays.lock().get(&page_index).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.failing.lock() {
            return Err(PageError::Transport("connection refused".to_string()));
        }
        if page_index >= self.total_pages {
            return Err(PageError::Status(400));
        }

        let sentences = vec![
            Sentence::new(format!("Page {} opens.", page_index), page_index),
            Sentence::new(format!("Page {} closes.", page_index), page_index),
        ];

        Ok(BookDocument::new(
            book_id,
            self.title.clone(),
            self.total_pages,
            page_index,
            self.chapters.clone(),
            sentences,
        ))
    }
}
