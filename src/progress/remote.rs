//! Remote progress store
//!
//! Authoritative, identity-scoped progress storage reached over the network.
//! Only usable while the reader is authenticated.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::StatusCode;
use thiserror::Error;

use super::types::{ProgressRecord, ProgressResponse, ProgressUpdate};

/// Remote store errors
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Call made without a valid credential
    #[error("Unauthorized")]
    Unauthorized,

    #[error("No remote progress for book: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, RemoteError::Unauthorized)
    }
}

pub type Result<T> = std::result::Result<T, RemoteError>;

/// Read/write access to the reader's remote progress
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the saved position for a book
    async fn get(&self, book_id: &str) -> Result<ProgressRecord>;

    /// Overwrite the saved position for a book
    async fn set(&self, book_id: &str, page: u32, title: &str) -> Result<()>;
}

/// HTTP client for the `/api/v1/progress` API
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
    credential: RwLock<Option<String>>,
}

impl HttpRemoteStore {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credential: RwLock::new(None),
        }
    }

    /// Attach (or clear) the bearer credential sent with every call
    pub fn set_credential(&self, token: Option<String>) {
        *self.credential.write() = token;
    }

    fn credential(&self) -> Result<String> {
        self.credential
            .read()
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or(RemoteError::Unauthorized)
    }

    fn book_url(&self, book_id: &str) -> String {
        format!(
            "{}/api/v1/progress/{}",
            self.base_url,
            urlencoding::encode(book_id)
        )
    }

    /// All saved positions of the reader, most recent first
    pub async fn list(&self) -> Result<Vec<ProgressRecord>> {
        let token = self.credential()?;
        let response = self
            .client
            .get(format!("{}/api/v1/progress", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let response = check_status(response, "")?;
        let items: Vec<ProgressResponse> = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        Ok(items.into_iter().map(ProgressRecord::from).collect())
    }

    /// Remove the saved position for a book
    pub async fn delete(&self, book_id: &str) -> Result<()> {
        let token = self.credential()?;
        let response = self
            .client
            .delete(self.book_url(book_id))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        check_status(response, book_id)?;
        Ok(())
    }
}

fn check_status(response: reqwest::Response, book_id: &str) -> Result<reqwest::Response> {
    match response.status() {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RemoteError::Unauthorized),
        StatusCode::NOT_FOUND => Err(RemoteError::NotFound(book_id.to_string())),
        status if status.is_success() => Ok(response),
        status => Err(RemoteError::Status(status.as_u16())),
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn get(&self, book_id: &str) -> Result<ProgressRecord> {
        let token = self.credential()?;
        let response = self
            .client
            .get(self.book_url(book_id))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let response = check_status(response, book_id)?;
        let body: ProgressResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        Ok(body.into())
    }

    async fn set(&self, book_id: &str, page: u32, title: &str) -> Result<()> {
        let token = self.credential()?;
        let update = ProgressUpdate {
            current_page: page,
            book_title: Some(title.to_string()),
        };

        let response = self
            .client
            .put(self.book_url(book_id))
            .bearer_auth(token)
            .json(&update)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        check_status(response, book_id)?;
        Ok(())
    }
}
