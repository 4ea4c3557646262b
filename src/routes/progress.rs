//! Reading progress API routes
//!
//! Server side of the remote progress store. Every record belongs to the
//! reader named by the bearer credential.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::identity::ReaderIdentity;
use crate::db::ProgressRepository;
use crate::error::{AppError, Result};
use crate::progress::{ProgressResponse, ProgressUpdate};
use crate::state::AppState;

/// Create the progress router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_progress))
        .route(
            "/:book_id",
            get(get_progress).put(update_progress).delete(delete_progress),
        )
}

/// List all progress of the reader
async fn list_progress(
    State(state): State<AppState>,
    reader: ReaderIdentity,
) -> Result<Json<Vec<ProgressResponse>>> {
    let repo = ProgressRepository::new(state.db());
    Ok(Json(repo.list(reader.as_str()).await?))
}

/// Get progress for a specific book
async fn get_progress(
    State(state): State<AppState>,
    reader: ReaderIdentity,
    Path(book_id): Path<String>,
) -> Result<Json<ProgressResponse>> {
    let repo = ProgressRepository::new(state.db());
    let progress = repo
        .get(reader.as_str(), &book_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No progress for book: {}", book_id)))?;
    Ok(Json(progress))
}

/// Update progress for a book
async fn update_progress(
    State(state): State<AppState>,
    reader: ReaderIdentity,
    Path(book_id): Path<String>,
    payload: std::result::Result<Json<ProgressUpdate>, JsonRejection>,
) -> Result<Json<ProgressResponse>> {
    let Json(update) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let book = state.library().get(&book_id).await?;

    let repo = ProgressRepository::new(state.db());
    let progress = repo
        .upsert(
            reader.as_str(),
            &book_id,
            update.current_page,
            update.book_title.as_deref(),
            &book.book.title,
        )
        .await?;
    Ok(Json(progress))
}

/// Delete progress for a book
async fn delete_progress(
    State(state): State<AppState>,
    reader: ReaderIdentity,
    Path(book_id): Path<String>,
) -> Result<StatusCode> {
    let repo = ProgressRepository::new(state.db());
    if repo.delete(reader.as_str(), &book_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("No progress for book: {}", book_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::test_state;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use tower::ServiceExt;

    fn request(method: Method, uri: &str, token: Option<&str>, body: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_requires_credential() {
        let (state, _dir) = test_state().await;
        let app = crate::routes::app(state);

        for token in [None, Some(" ")] {
            let response = app
                .clone()
                .oneshot(request(Method::GET, "/api/v1/progress/moby", token, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let (state, _dir) = test_state().await;
        let app = crate::routes::app(state);

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/api/v1/progress/moby", Some("alice"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .clone()
            .oneshot(request(
                Method::PUT,
                "/api/v1/progress/moby",
                Some("alice"),
                Some(r#"{"currentPage": 3}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let saved: ProgressResponse = json(response).await;
        assert_eq!(saved.current_page, 3);
        assert_eq!(saved.book_title, "Moby Dick");

        let response = app
            .oneshot(request(Method::GET, "/api/v1/progress/moby", Some("alice"), None))
            .await
            .unwrap();
        let fetched: ProgressResponse = json(response).await;
        assert_eq!(fetched.current_page, 3);
        assert_eq!(fetched.book_id, "moby");
    }

    #[tokio::test]
    async fn test_put_malformed_body() {
        let (state, _dir) = test_state().await;
        let app = crate::routes::app(state);

        for body in [r#"{"currentPage": -1}"#, r#"{"bookTitle": "Moby"}"#, "not json"] {
            let response = app
                .clone()
                .oneshot(request(Method::PUT, "/api/v1/progress/moby", Some("alice"), Some(body)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let error: serde_json::Value = json(response).await;
            assert_eq!(error["error"], "bad_request");
        }
    }

    #[tokio::test]
    async fn test_put_unknown_book() {
        let (state, _dir) = test_state().await;
        let response = crate::routes::app(state)
            .oneshot(request(
                Method::PUT,
                "/api/v1/progress/nope",
                Some("alice"),
                Some(r#"{"currentPage": 1, "bookTitle": "Nope"}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let (state, _dir) = test_state().await;
        let app = crate::routes::app(state);

        app.clone()
            .oneshot(request(
                Method::PUT,
                "/api/v1/progress/moby",
                Some("alice"),
                Some(r#"{"currentPage": 2, "bookTitle": "Moby"}"#),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/api/v1/progress", Some("bob"), None))
            .await
            .unwrap();
        let listed: Vec<ProgressResponse> = json(response).await;
        assert!(listed.is_empty());

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/api/v1/progress", Some("alice"), None))
            .await
            .unwrap();
        let listed: Vec<ProgressResponse> = json(response).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].book_title, "Moby");

        let response = app
            .clone()
            .oneshot(request(Method::DELETE, "/api/v1/progress/moby", Some("alice"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(request(Method::DELETE, "/api/v1/progress/moby", Some("alice"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
