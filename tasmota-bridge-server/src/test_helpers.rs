//! Test helpers for tasmota-bridge-server unit tests.

use std::sync::Arc;

use tasmota_bridge_core::{JsonFileConfigStore, MemoryConfigStore, SyncController};
use tasmota_bridge_types::BridgeConfig;
use tempfile::TempDir;

use crate::state::AppState;

/// `AppState` backed by a config file in a fresh temp dir.
///
/// Returns `(AppState, TempDir)`; keep `TempDir` alive for the test duration.
pub fn test_app_state() -> (AppState, TempDir) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let store = JsonFileConfigStore::new(temp_dir.path().join("tasmota_bridge.json"));
    let controller = SyncController::new(BridgeConfig::default(), Arc::new(store));
    (AppState::new(Arc::new(controller)), temp_dir)
}

/// `AppState` whose store rejects every write.
pub fn read_only_app_state() -> AppState {
    let controller =
        SyncController::new(BridgeConfig::default(), Arc::new(MemoryConfigStore::read_only()));
    AppState::new(Arc::new(controller))
}
