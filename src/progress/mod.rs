//! Reading progress persistence
//!
//! Provides:
//! - A durable on-device cache of the last position per book
//! - An identity-scoped remote store reached over HTTP
//! - The reconciler that arbitrates between the two
//!
//! # Arbitration
//!
//! 1. When authenticated, a remote record wins outright, whatever its timestamp
//! 2. Otherwise a local record past page 0 is offered
//! 3. Otherwise the book starts at page 0 with no offer
//!
//! Writes go to the local cache first-class and to the remote store
//! fire-and-forget. Concurrent remote writes land in arrival order.

mod local;
mod reconciler;
mod remote;
mod types;

pub use local::{CacheError, FileCache, LocalCache, MemoryCache, PROGRESS_NAMESPACE};
pub use reconciler::{Persisted, ProgressReconciler};
pub use remote::{HttpRemoteStore, RemoteError, RemoteStore};
pub use types::{
    CachedProgress, PositionSource, ProgressRecord, ProgressResponse, ProgressUpdate,
    ResolvedPosition,
};
