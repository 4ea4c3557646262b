//! Book page API
//!
//! Serves one page of a book at a time:
//! - `GET /` lists the library
//! - `GET /:book_id?page=N` returns the page as a book document

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::document::BookDocument;
use crate::error::Result;
use crate::library::BookSummary;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: u32,
}

/// Create the books router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_books))
        .route("/:book_id", get(get_page))
}

async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<BookSummary>>> {
    Ok(Json(state.library().list().await?))
}

/// Page of a book; out-of-range pages are clamped to the nearest valid one
async fn get_page(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<BookDocument>> {
    let document = state.library().page(&book_id, query.page).await?;
    tracing::debug!(
        "Serving page {}/{} of {}",
        document.current_page,
        document.total_pages,
        book_id
    );
    Ok(Json(document))
}

#[cfg(test)]
mod tests {
    use crate::document::BookDocument;
    use crate::library::BookSummary;
    use crate::routes::testing::test_state;
    use axum::http::StatusCode;
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_get_page() {
        let (state, _dir) = test_state().await;
        let server = TestServer::new(crate::routes::app(state)).unwrap();

        let response = server.get("/api/v1/books/moby").add_query_param("page", 1).await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let doc: BookDocument = response.json();
        assert_eq!(doc.book_id, "moby");
        assert_eq!(doc.title, "Moby Dick");
        assert_eq!(doc.current_page, 1);
        assert_eq!(doc.total_pages, 3);
        assert!(doc.has_previous && doc.has_next);
        assert_eq!(doc.sentences[0].content, "THE CARPET-BAG.");

        let starts: Vec<u32> = doc.chapters.iter().map(|c| c.start_page).collect();
        assert_eq!(starts, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_page_defaults_and_clamps() {
        let (state, _dir) = test_state().await;
        let server = TestServer::new(crate::routes::app(state)).unwrap();

        let first: BookDocument = server.get("/api/v1/books/moby").await.json();
        assert_eq!(first.current_page, 0);
        assert!(!first.has_previous);

        let clamped: BookDocument = server
            .get("/api/v1/books/moby")
            .add_query_param("page", 99)
            .await
            .json();
        assert_eq!(clamped.current_page, 2);
        assert!(!clamped.has_next);
    }

    #[tokio::test]
    async fn test_unknown_book() {
        let (state, _dir) = test_state().await;
        let server = TestServer::new(crate::routes::app(state)).unwrap();

        let response = server.get("/api/v1/books/missing").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_list_books() {
        let (state, _dir) = test_state().await;
        let server = TestServer::new(crate::routes::app(state)).unwrap();

        let books: Vec<BookSummary> = server.get("/api/v1/books").await.json();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Moby Dick");
    }
}
