//! Page source
//!
//! External service producing one `BookDocument` per (book, page) request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::document::BookDocument;

/// Page fetch errors
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Book not found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Decode error: {0}")]
    Decode(String),
}

/// Produces pages of a book
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page; out-of-range handling is up to the source
    async fn fetch(&self, book_id: &str, page_index: u32) -> Result<BookDocument, PageError>;
}

/// HTTP client for `GET /api/v1/books/:book_id?page=N`
#[derive(Clone)]
pub struct HttpPageSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPageSource {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, book_id: &str, page_index: u32) -> Result<BookDocument, PageError> {
        let url = format!(
            "{}/api/v1/books/{}",
            self.base_url,
            urlencoding::encode(book_id)
        );

        let response = self
            .client
            .get(url)
            .query(&[("page", page_index)])
            .send()
            .await
            .map_err(|e| PageError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(PageError::NotFound(book_id.to_string())),
            status if status.is_success() => response
                .json::<BookDocument>()
                .await
                .map_err(|e| PageError::Decode(e.to_string())),
            status => Err(PageError::Status(status.as_u16())),
        }
    }
}
