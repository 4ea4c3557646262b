//! Route modules for Pagemark Server

pub mod books;
pub mod health;
pub mod identity;
pub mod progress;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use identity::ReaderIdentity;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/health", health::router())
        .nest("/api/v1/health", health::router())
        .nest("/api/v1/books", books::router())
        .nest("/api/v1/progress", progress::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
