//! Progress data types
//!
//! Defines the saved reading position and the wire formats used by the
//! local cache and the remote progress API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last known reading position for one book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub book_id: String,
    /// Page index valid for the book at the time of the write
    pub page: u32,
    pub title: String,
    pub last_read_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// Create a record stamped with the current time
    pub fn now(book_id: &str, page: u32, title: &str) -> Self {
        Self {
            book_id: book_id.to_string(),
            page,
            title: title.to_string(),
            last_read_at: Utc::now(),
        }
    }
}

/// Which store a resolved position came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSource {
    Remote,
    Local,
}

/// Position chosen when a book is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPosition {
    pub page: u32,
    pub title: String,
    pub last_read_at: DateTime<Utc>,
    pub source: PositionSource,
}

impl ResolvedPosition {
    pub(crate) fn from_record(record: ProgressRecord, source: PositionSource) -> Self {
        Self {
            page: record.page,
            title: record.title,
            last_read_at: record.last_read_at,
            source,
        }
    }
}

/// Cache entry as persisted on the device, keyed by book id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedProgress {
    pub page: u32,
    pub title: String,
    pub last_read_at: DateTime<Utc>,
}

impl CachedProgress {
    pub fn into_record(self, book_id: &str) -> ProgressRecord {
        ProgressRecord {
            book_id: book_id.to_string(),
            page: self.page,
            title: self.title,
            last_read_at: self.last_read_at,
        }
    }
}

impl From<&ProgressRecord> for CachedProgress {
    fn from(record: &ProgressRecord) -> Self {
        Self {
            page: record.page,
            title: record.title.clone(),
            last_read_at: record.last_read_at,
        }
    }
}

/// Progress as returned by the remote API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub book_id: String,
    pub book_title: String,
    pub current_page: u32,
    pub last_read_at: DateTime<Utc>,
}

impl From<ProgressResponse> for ProgressRecord {
    fn from(response: ProgressResponse) -> Self {
        Self {
            book_id: response.book_id,
            page: response.current_page,
            title: response.book_title,
            last_read_at: response.last_read_at,
        }
    }
}

/// Progress update sent to the remote API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub current_page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_title: Option<String>,
}
