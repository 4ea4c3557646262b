//! Application state management

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::library::LibraryStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    db: SqlitePool,
    library: LibraryStore,
}

impl AppState {
    pub fn new(config: Config, db: SqlitePool, library: LibraryStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, db, library }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the database pool
    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    /// Get the book library
    pub fn library(&self) -> &LibraryStore {
        &self.inner.library
    }
}
