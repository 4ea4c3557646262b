//! Reader identity from the bearer credential
//!
//! The token itself is the reader's identity; anything issuing or checking
//! tokens sits in front of this server.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderIdentity(pub String);

impl ReaderIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ReaderIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing credential".to_string()))?
            .to_str()
            .map_err(|_| AppError::Unauthorized("Malformed credential".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Expected a bearer credential".to_string()))?;

        Ok(ReaderIdentity(token.to_string()))
    }
}
