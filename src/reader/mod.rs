//! Reader core
//!
//! Client-side state for an open book: the auth signal, the page source,
//! the pagination engine, the resume prompt, and the session tying them
//! together. Everything here runs on the caller's async runtime; network
//! calls never block a page that is already rendered.

mod auth;
mod pagination;
mod prompt;
mod session;
mod source;

pub use auth::{AuthSignal, SessionAuth};
pub use pagination::PaginationEngine;
pub use prompt::{ContinuePrompt, PromptError, PromptState};
pub use session::{ReaderSession, SessionError};
pub use source::{HttpPageSource, PageError, PageSource};
