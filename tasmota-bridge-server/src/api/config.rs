//! Configuration handlers

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use tasmota_bridge_types::{BridgeConfig, ConfigField};
use tracing::warn;

use crate::state::AppState;

/// `{"success": true}` or `{"success": false, "msg": "..."}`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveConfigResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

pub async fn get_config_description(
    State(state): State<AppState>,
) -> Json<&'static [ConfigField]> {
    Json(state.controller().describe())
}

pub async fn get_config(State(state): State<AppState>) -> Json<BridgeConfig> {
    Json(state.controller().get())
}

pub async fn save_config(
    State(state): State<AppState>,
    Json(payload): Json<BridgeConfig>,
) -> Result<Json<SaveConfigResponse>, (StatusCode, Json<SaveConfigResponse>)> {
    match state.controller().set(payload).await {
        Ok(()) => Ok(Json(SaveConfigResponse { success: true, msg: None })),
        Err(e) => {
            warn!("[Config] Rejected configuration: {}", e);
            let status = if e.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            Err((status, Json(SaveConfigResponse { success: false, msg: Some(e.to_string()) })))
        },
    }
}
