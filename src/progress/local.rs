//! Local progress cache
//!
//! Durable on-device storage for the last known position of each book.
//! Has no network dependency; every write overwrites the previous entry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use thiserror::Error;

use super::types::{CachedProgress, ProgressRecord};

/// Key under which all book positions are stored
pub const PROGRESS_NAMESPACE: &str = "readingProgress";

/// Local cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache corrupted: {0}")]
    Corrupt(String),

    #[error("Cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// Synchronous key-value store of progress records, keyed by book id
pub trait LocalCache: Send + Sync {
    fn get(&self, book_id: &str) -> Result<Option<ProgressRecord>>;

    fn set(&self, book_id: &str, record: &ProgressRecord) -> Result<()>;
}

/// In-memory cache, mainly for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, ProgressRecord>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl LocalCache for MemoryCache {
    fn get(&self, book_id: &str) -> Result<Option<ProgressRecord>> {
        Ok(self.entries.lock().get(book_id).cloned())
    }

    fn set(&self, book_id: &str, record: &ProgressRecord) -> Result<()> {
        let mut record = record.clone();
        record.book_id = book_id.to_string();
        self.entries.lock().insert(book_id.to_string(), record);
        Ok(())
    }
}

/// File-backed cache.
///
/// The file holds a JSON object of namespaced keys. All positions live under
/// [`PROGRESS_NAMESPACE`] as a mapping from book id to
/// `{ page, title, lastReadAt }`; other keys in the file are left untouched.
pub struct FileCache {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the top-level key map; a missing file is an empty map
    fn read_root(&self) -> Result<Map<String, Value>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(root)) => Ok(root),
            Ok(_) => Err(CacheError::Corrupt("top level is not an object".to_string())),
            Err(e) => Err(CacheError::Corrupt(e.to_string())),
        }
    }

    fn read_namespace(root: &Map<String, Value>) -> Result<HashMap<String, CachedProgress>> {
        match root.get(PROGRESS_NAMESPACE) {
            None => Ok(HashMap::new()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| CacheError::Corrupt(format!("{}: {}", PROGRESS_NAMESPACE, e))),
        }
    }

    fn write_root(&self, root: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Replace via rename so a crash never leaves a half-written file
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec(root)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl LocalCache for FileCache {
    fn get(&self, book_id: &str) -> Result<Option<ProgressRecord>> {
        let _guard = self.lock.lock();
        let root = self.read_root()?;
        let mut entries = Self::read_namespace(&root)?;

        Ok(entries
            .remove(book_id)
            .map(|entry| entry.into_record(book_id)))
    }

    fn set(&self, book_id: &str, record: &ProgressRecord) -> Result<()> {
        let _guard = self.lock.lock();

        let mut root = match self.read_root() {
            Ok(root) => root,
            Err(CacheError::Corrupt(reason)) => {
                tracing::warn!(
                    "Progress cache {} is corrupted ({}), starting fresh",
                    self.path.display(),
                    reason
                );
                Map::new()
            }
            Err(e) => return Err(e),
        };

        let mut entries = Self::read_namespace(&root).unwrap_or_else(|e| {
            tracing::warn!("Discarding unreadable progress entries: {}", e);
            HashMap::new()
        });
        entries.insert(book_id.to_string(), CachedProgress::from(record));

        root.insert(PROGRESS_NAMESPACE.to_string(), serde_json::to_value(&entries)?);
        self.write_root(&root)
    }
}
