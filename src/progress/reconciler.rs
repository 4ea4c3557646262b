//! Progress reconciliation
//!
//! Decides which saved position to offer when a book is opened and writes
//! new positions to every eligible store.
//!
//! Policy: an authenticated remote record always wins; otherwise a local
//! record past page 0 is used. Remote failures never block reading.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::local::{self, LocalCache};
use super::remote::{RemoteError, RemoteStore};
use super::types::{PositionSource, ProgressRecord, ResolvedPosition};

/// Arbitrates between the local cache and the remote store
#[derive(Clone)]
pub struct ProgressReconciler {
    local: Arc<dyn LocalCache>,
    remote: Arc<dyn RemoteStore>,
}

/// Outcome of a persist call.
///
/// The local write has already happened; the remote write, if any, runs
/// detached and may still be in flight.
pub struct Persisted {
    pub local: local::Result<()>,
    remote: Option<JoinHandle<()>>,
}

impl Persisted {
    pub fn has_remote_write(&self) -> bool {
        self.remote.is_some()
    }

    /// Wait for the detached remote write to finish
    pub async fn settled(self) {
        if let Some(handle) = self.remote {
            if let Err(e) = handle.await {
                tracing::warn!("Remote progress write task failed: {}", e);
            }
        }
    }
}

impl ProgressReconciler {
    pub fn new(local: Arc<dyn LocalCache>, remote: Arc<dyn RemoteStore>) -> Self {
        Self { local, remote }
    }

    /// Pick the position to offer for a book.
    ///
    /// Read-only. Any remote failure degrades to "no remote record", and a
    /// local read failure degrades to "no local record".
    pub async fn resolve(&self, book_id: &str, is_authenticated: bool) -> Option<ResolvedPosition> {
        if is_authenticated {
            match self.remote.get(book_id).await {
                Ok(record) => {
                    tracing::debug!("Resolved book {} from remote at page {}", book_id, record.page);
                    return Some(ResolvedPosition::from_record(record, PositionSource::Remote));
                }
                Err(e) => log_remote_failure(RemoteAction::Read, book_id, &e),
            }
        }

        match self.local.get(book_id) {
            Ok(Some(record)) if record.page > 0 => {
                tracing::debug!("Resolved book {} from local cache at page {}", book_id, record.page);
                Some(ResolvedPosition::from_record(record, PositionSource::Local))
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Failed to load local progress for book {}: {}", book_id, e);
                None
            }
        }
    }

    /// Record a new position.
    ///
    /// Always writes the local cache; when authenticated, also starts a
    /// detached remote write. The two writes succeed or fail independently.
    pub fn persist(&self, book_id: &str, page: u32, title: &str, is_authenticated: bool) -> Persisted {
        let remote = if is_authenticated {
            self.spawn_remote_write(book_id, page, title)
        } else {
            None
        };

        let record = ProgressRecord::now(book_id, page, title);
        let local = self.local.set(book_id, &record);
        if let Err(e) = &local {
            tracing::warn!("Failed to save local progress for book {}: {}", book_id, e);
        }

        Persisted { local, remote }
    }

    fn spawn_remote_write(&self, book_id: &str, page: u32, title: &str) -> Option<JoinHandle<()>> {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!(
                "No async runtime available, skipping remote progress write for book {}",
                book_id
            );
            return None;
        };

        let store = Arc::clone(&self.remote);
        let book_id = book_id.to_string();
        let title = title.to_string();

        Some(runtime.spawn(async move {
            match store.set(&book_id, page, &title).await {
                Ok(()) => tracing::debug!("Saved remote progress for book {} at page {}", book_id, page),
                Err(e) => log_remote_failure(RemoteAction::Write, &book_id, &e),
            }
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RemoteAction {
    Read,
    Write,
}

impl RemoteAction {
    fn as_str(self) -> &'static str {
        match self {
            RemoteAction::Read => "read",
            RemoteAction::Write => "write",
        }
    }
}

/// Unauthorized calls are expected; a missing record only on read
fn is_expected_failure(action: RemoteAction, err: &RemoteError) -> bool {
    matches!(
        (action, err),
        (_, RemoteError::Unauthorized) | (RemoteAction::Read, RemoteError::NotFound(_))
    )
}

fn log_remote_failure(action: RemoteAction, book_id: &str, err: &RemoteError) {
    if is_expected_failure(action, err) {
        tracing::debug!("Remote progress {} skipped for book {}: {}", action.as_str(), book_id, err);
    } else {
        tracing::warn!("Remote progress {} failed for book {}: {}", action.as_str(), book_id, err);
    }
}
