//! Sync state handlers

use axum::{extract::State, response::Json};
use tasmota_bridge_types::SyncStatusReport;

use crate::state::AppState;

pub async fn get_sync_status(State(state): State<AppState>) -> Json<SyncStatusReport> {
    Json(state.controller().status())
}
