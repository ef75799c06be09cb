use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::static_files::static_handler;
use super::state::AppState;

// UI Routes - chat page and its assets
pub fn ui_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::ui::index_handler))
        .route("/static/{*path}", get(static_handler))
}

// API Routes - what the chat page talks to
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().nest(
        "/api",
        Router::new()
            // Connection form
            .route("/connect", post(handlers::api::connect))
            .route("/defaults", get(handlers::api::connection_defaults))
            // Conversation
            .route("/chat", post(handlers::api::chat))
            .route("/history", get(handlers::api::history))
            .route("/schema", get(handlers::api::get_schema))
            // System status
            .route("/status", get(handlers::api::system_status)),
    )
}
