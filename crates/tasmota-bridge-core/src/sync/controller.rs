//! Configuration Interface
//!
//! `describe` / `get` / `set` over the bridge configuration. `set` is the
//! only path that rebuilds the registry and resets retry state outside of
//! normal cooldown expiry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::json;
use tasmota_bridge_types::{
    BridgeConfig, ConfigError, ConfigField, SyncStatusReport, CONFIG_DESCRIPTION,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::reconciler::Reconciler;
use super::session::{SessionSlot, SyncSession};
use crate::device::DeviceUpdater;
use crate::modules::config::ConfigStore;
use crate::source::OutputStateSource;

pub struct SyncController {
    config: RwLock<BridgeConfig>,
    slot: Arc<SessionSlot>,
    store: Arc<dyn ConfigStore>,
    /// Serializes `set` calls so persist + swap happen as one step.
    write_lock: Mutex<()>,
    generation: AtomicU64,
}

impl SyncController {
    /// Start from `config` as-is. Stored configs are not re-validated, so
    /// mappings with a bad `output_id` stay visible and are skipped by sync.
    pub fn new(config: BridgeConfig, store: Arc<dyn ConfigStore>) -> Self {
        let session = SyncSession::from_config(&config, 0);
        info!(
            devices = session.registry().len(),
            "[Config] Tasmota bridge is {}",
            if session.is_enabled() { "enabled" } else { "disabled" }
        );
        Self {
            config: RwLock::new(config),
            slot: Arc::new(SessionSlot::new(session)),
            store,
            write_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Load the stored config, falling back to defaults if none exists.
    pub async fn load(store: Arc<dyn ConfigStore>) -> Result<Self, ConfigError> {
        let config = store.load().await?.unwrap_or_default();
        Ok(Self::new(config, store))
    }

    pub fn describe(&self) -> &'static [ConfigField] {
        CONFIG_DESCRIPTION
    }

    pub fn get(&self) -> BridgeConfig {
        self.config.read().clone()
    }

    /// Validate, persist and activate `config`.
    ///
    /// On any error the active config and sync state are left untouched.
    pub async fn set(&self, config: BridgeConfig) -> Result<(), ConfigError> {
        config.check()?;

        let _guard = self.write_lock.lock().await;
        self.store.save(&config).await?;

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let session = SyncSession::from_config(&config, generation);
        let devices = session.registry().len();
        *self.config.write() = config;
        self.slot.replace(session);

        info!(generation, devices, "[Config] Configuration applied, sync state reset");
        Ok(())
    }

    pub fn status(&self) -> SyncStatusReport {
        self.slot.load().status()
    }

    pub fn slot(&self) -> Arc<SessionSlot> {
        Arc::clone(&self.slot)
    }

    /// Build the reconciliation loop bound to this controller's sessions.
    pub fn reconciler(
        &self,
        source: Arc<dyn OutputStateSource>,
        updater: Arc<dyn DeviceUpdater>,
    ) -> Reconciler {
        Reconciler::new(self.slot(), source, updater)
    }

    /// Serialized [`describe`](Self::describe).
    pub fn get_config_description(&self) -> String {
        to_json_string(&self.describe())
    }

    /// Serialized [`get`](Self::get).
    pub fn get_config(&self) -> String {
        to_json_string(&self.get())
    }

    /// Parse and [`set`](Self::set) a JSON config, answering
    /// `{"success": true}` or `{"success": false, "msg": ...}`.
    pub async fn set_config(&self, payload: &str) -> String {
        let result = match serde_json::from_str::<BridgeConfig>(payload) {
            Ok(config) => self.set(config).await,
            Err(e) => Err(ConfigError::from_json_error(&e)),
        };

        match result {
            Ok(()) => json!({ "success": true }).to_string(),
            Err(e) => {
                warn!("[Config] Rejected configuration: {}", e);
                json!({ "success": false, "msg": e.to_string() }).to_string()
            },
        }
    }
}

fn to_json_string<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        warn!("[Config] Serialization failed: {}", e);
        json!({ "success": false, "msg": e.to_string() }).to_string()
    })
}
