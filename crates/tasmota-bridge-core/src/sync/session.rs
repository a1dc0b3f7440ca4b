//! One generation of sync state: the registry, its state store and the
//! policy derived from the same config. Sessions are replaced whole.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tasmota_bridge_types::{BridgeConfig, DeviceSyncStatus, SyncStatusReport};
use tokio::sync::Notify;

use super::registry::DeviceRegistry;
use super::state::{RetryPolicy, SyncStateStore};

#[derive(Debug)]
pub struct SyncSession {
    generation: u64,
    registry: DeviceRegistry,
    store: SyncStateStore,
    policy: RetryPolicy,
    refresh_interval: Duration,
}

impl SyncSession {
    pub fn from_config(config: &BridgeConfig, generation: u64) -> Self {
        let registry = DeviceRegistry::build(&config.tasmota_mapping);
        let store = SyncStateStore::new(registry.output_ids());
        Self {
            generation,
            registry,
            store,
            policy: RetryPolicy::new(config.max_retries, config.clear_interval),
            refresh_interval: Duration::from_secs(config.refresh_interval.max(1)),
        }
    }

    /// Sync is enabled as soon as one mapping made it into the registry.
    pub fn is_enabled(&self) -> bool {
        !self.registry.is_empty()
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub const fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub const fn store(&self) -> &SyncStateStore {
        &self.store
    }

    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub const fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn status(&self) -> SyncStatusReport {
        let devices = self
            .registry
            .iter()
            .map(|mapping| {
                let state = self.store.get(mapping.output_id).unwrap_or_default();
                DeviceSyncStatus {
                    label: mapping.label.clone(),
                    address: mapping.address.clone(),
                    output_id: mapping.output_id,
                    last_pushed: state.last_pushed,
                    failure_count: state.failure_count(),
                    phase: state.phase(),
                    cooldown_until: state.cooldown_until(),
                }
            })
            .collect();

        SyncStatusReport { enabled: self.is_enabled(), generation: self.generation, devices }
    }
}

/// Shared slot holding the current session.
///
/// Readers clone the `Arc` once and drop the lock immediately, so a
/// replacement never waits on an in-flight tick and a tick never sees a
/// half-built session.
#[derive(Debug)]
pub struct SessionSlot {
    current: RwLock<Arc<SyncSession>>,
    changed: Notify,
}

impl SessionSlot {
    pub fn new(session: SyncSession) -> Self {
        Self { current: RwLock::new(Arc::new(session)), changed: Notify::new() }
    }

    pub fn load(&self) -> Arc<SyncSession> {
        Arc::clone(&self.current.read())
    }

    /// Swap in `session` and wake the loop if it is sleeping.
    pub fn replace(&self, session: SyncSession) -> Arc<SyncSession> {
        let next = Arc::new(session);
        let previous = std::mem::replace(&mut *self.current.write(), Arc::clone(&next));
        self.changed.notify_one();
        tracing::debug!(
            from = previous.generation(),
            to = next.generation(),
            "[Sync] Session replaced"
        );
        next
    }

    /// Resolves after the next [`replace`](Self::replace), or immediately if
    /// one happened since the last wait.
    pub async fn changed(&self) {
        self.changed.notified().await;
    }
}
