//! API Routes
//!
//! REST API over the configuration interface and the sync state.

mod config;
mod sync;


use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        // Config
        .route("/config", get(config::get_config).post(config::save_config))
        .route("/config/description", get(config::get_config_description))
        // Sync
        .route("/sync/status", get(sync::get_sync_status))
        // API fallback: return 404 for unknown API endpoints
        .fallback(api_not_found)
}

async fn api_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({"error": "Not found"})))
}
