//! Application State
//!
//! Shared handle to the sync controller for the REST handlers.

use std::sync::Arc;

use tasmota_bridge_core::SyncController;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub(crate) inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub controller: Arc<SyncController>,
}

impl AppState {
    pub fn new(controller: Arc<SyncController>) -> Self {
        Self { inner: Arc::new(AppStateInner { controller }) }
    }

    pub fn controller(&self) -> &SyncController {
        &self.inner.controller
    }
}
