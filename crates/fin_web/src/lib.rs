use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod state;

pub use state::AppState;

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/upload", post(handlers::upload))
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/news", get(handlers::news))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use fin_core::{Error, Result};
    pub use crate::{create_app, AppState};
}
