//! Authentication signal
//!
//! The reader core never authenticates anyone itself. It only asks a live
//! yes/no question before touching the remote progress store.

use std::sync::atomic::{AtomicBool, Ordering};

/// Live "is this reader authenticated" signal
pub trait AuthSignal: Send + Sync {
    fn is_authenticated(&self) -> bool;
}

/// Flag flipped by the identity subsystem on login and logout
#[derive(Debug, Default)]
pub struct SessionAuth {
    authenticated: AtomicBool,
}

impl SessionAuth {
    pub fn new(authenticated: bool) -> Self {
        Self {
            authenticated: AtomicBool::new(authenticated),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(false)
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        self.authenticated.store(authenticated, Ordering::SeqCst);
    }
}

impl AuthSignal for SessionAuth {
    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }
}
