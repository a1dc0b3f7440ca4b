//! Device Sync State Store
//!
//! Per-output retry state. Each device moves through three phases:
//!
//! ```text
//!            failure                  failure (count > max_retries)
//!   Active ───────────► Failing(n) ─────────────────────────────► CoolingDown(until)
//!     ▲                     │                                            │
//!     └──── success ────────┘◄─────── now >= until (lazy, next check) ───┘
//! ```
//!
//! Expiry is evaluated lazily by [`SyncStateStore::is_cooling_down`], once per
//! tick per output; there is no timer. All state is in-memory and discarded
//! on reconfiguration.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tasmota_bridge_types::DevicePhase;
use tracing::{debug, info};

/// Bounded-retry policy shared by every device of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// A device goes on cooldown once its failure count is strictly greater
    /// than this, so it gets `max_retries + 1` attempts.
    pub max_retries: u32,
    pub clear_interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, clear_interval_minutes: u64) -> Self {
        let minutes = i64::try_from(clear_interval_minutes).unwrap_or(i64::MAX);
        let clear_interval = Duration::try_minutes(minutes).unwrap_or(Duration::MAX);
        Self { max_retries, clear_interval }
    }
}

/// Retry phase of one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceHealth {
    #[default]
    Active,
    Failing { failures: u32 },
    CoolingDown { failures: u32, until: DateTime<Utc> },
}

/// Mutable sync state for one output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncState {
    /// Power state the device reported on the last successful push.
    pub last_pushed: Option<bool>,
    pub health: DeviceHealth,
}

/// Result of a lazy cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownCheck {
    NotCooling,
    Cooling { until: DateTime<Utc> },
    /// The cooldown had elapsed and was just cleared together with the failure count.
    Expired,
}

impl SyncState {
    pub const fn failure_count(&self) -> u32 {
        match self.health {
            DeviceHealth::Active => 0,
            DeviceHealth::Failing { failures } | DeviceHealth::CoolingDown { failures, .. } => {
                failures
            },
        }
    }

    pub const fn cooldown_until(&self) -> Option<DateTime<Utc>> {
        match self.health {
            DeviceHealth::CoolingDown { until, .. } => Some(until),
            DeviceHealth::Active | DeviceHealth::Failing { .. } => None,
        }
    }

    pub const fn phase(&self) -> DevicePhase {
        match self.health {
            DeviceHealth::Active => DevicePhase::Active,
            DeviceHealth::Failing { .. } => DevicePhase::Failing,
            DeviceHealth::CoolingDown { .. } => DevicePhase::CoolingDown,
        }
    }

    /// True when the device already holds `desired` as far as this process knows.
    pub fn is_synced(&self, desired: bool) -> bool {
        self.last_pushed == Some(desired)
    }

    /// Check the cooldown at `now`, clearing it (and the failure count) if it elapsed.
    pub fn check_cooldown(&mut self, now: DateTime<Utc>) -> CooldownCheck {
        match self.health {
            DeviceHealth::CoolingDown { until, .. } if now < until => {
                CooldownCheck::Cooling { until }
            },
            DeviceHealth::CoolingDown { .. } => {
                self.health = DeviceHealth::Active;
                CooldownCheck::Expired
            },
            DeviceHealth::Active | DeviceHealth::Failing { .. } => CooldownCheck::NotCooling,
        }
    }

    /// Record a confirmed push; `reported` is the state the device answered with.
    pub fn record_success(&mut self, reported: bool) {
        self.last_pushed = Some(reported);
        self.health = DeviceHealth::Active;
    }

    /// Record a failed push. Returns the cooldown deadline if this failure
    /// exhausted the retry budget.
    pub fn record_failure(
        &mut self,
        policy: &RetryPolicy,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let failures = self.failure_count().saturating_add(1);

        if let DeviceHealth::CoolingDown { until, .. } = self.health {
            self.health = DeviceHealth::CoolingDown { failures, until };
            return None;
        }

        if failures > policy.max_retries {
            let until =
                now.checked_add_signed(policy.clear_interval).unwrap_or(DateTime::<Utc>::MAX_UTC);
            self.health = DeviceHealth::CoolingDown { failures, until };
            Some(until)
        } else {
            self.health = DeviceHealth::Failing { failures };
            None
        }
    }
}

/// One [`SyncState`] per registered output id.
#[derive(Debug, Default)]
pub struct SyncStateStore {
    states: Mutex<HashMap<i64, SyncState>>,
}

impl SyncStateStore {
    pub fn new(output_ids: impl IntoIterator<Item = i64>) -> Self {
        let store = Self::default();
        store.reset(output_ids);
        store
    }

    /// Drop all state and start every id from scratch.
    pub fn reset(&self, output_ids: impl IntoIterator<Item = i64>) {
        let mut states = self.states.lock();
        states.clear();
        states.extend(output_ids.into_iter().map(|id| (id, SyncState::default())));
    }

    /// True while `output_id` is on cooldown at `now`.
    ///
    /// An elapsed cooldown is cleared here, resetting the failure count, and
    /// the device becomes eligible again in the same call.
    pub fn is_cooling_down(&self, output_id: i64, now: DateTime<Utc>) -> bool {
        let mut states = self.states.lock();
        let Some(state) = states.get_mut(&output_id) else {
            return false;
        };
        match state.check_cooldown(now) {
            CooldownCheck::Cooling { .. } => true,
            CooldownCheck::Expired => {
                info!(output_id, "[Sync] Cooldown elapsed, resetting retries for output");
                false
            },
            CooldownCheck::NotCooling => false,
        }
    }

    pub fn on_success(&self, output_id: i64, reported: bool) {
        if let Some(state) = self.states.lock().get_mut(&output_id) {
            state.record_success(reported);
        } else {
            debug!(output_id, "[Sync] Ignoring success for unregistered output");
        }
    }

    /// Returns the cooldown deadline if this failure started a cooldown.
    pub fn on_failure(
        &self,
        output_id: i64,
        policy: &RetryPolicy,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        match self.states.lock().get_mut(&output_id) {
            Some(state) => state.record_failure(policy, now),
            None => {
                debug!(output_id, "[Sync] Ignoring failure for unregistered output");
                None
            },
        }
    }

    pub fn get(&self, output_id: i64) -> Option<SyncState> {
        self.states.lock().get(&output_id).copied()
    }

    pub fn len(&self) -> usize {
        self.states.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.lock().is_empty()
    }
}
