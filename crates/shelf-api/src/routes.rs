//! Route and middleware assembly.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, put},
    Extension, Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/fs/stream", put(handlers::stream::upload_stream))
        .route("/api/fs/form", put(handlers::form::upload_form))
        .layer(Extension(state.root_principal.clone()))
        .layer(DefaultBodyLimit::max(state.config.max_body_size_bytes()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
