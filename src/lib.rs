//! Pagemark
//!
//! Resumable book reading: a reader core that pages through books served one
//! page at a time and remembers where each book was left, plus the server
//! that provides the pages and the remote progress store.
//!
//! # Modules
//!
//! - `document`: page model, chapter ranges, paragraph grouping
//! - `progress`: local cache, remote store and the reconciler between them
//! - `reader`: pagination engine, resume prompt and the book-open session
//! - `library`, `db`, `routes`: the server side

pub mod config;
pub mod db;
pub mod document;
pub mod error;
pub mod library;
pub mod progress;
pub mod reader;
pub mod routes;
pub mod state;

#[cfg(test)]
mod testing;
