//! Read-only view of the sync state, exposed over the REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Retry phase of one device.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DevicePhase {
    /// No failures since the last success
    Active,
    /// Failing but still within the retry budget
    Failing,
    /// Retry budget exhausted, skipped until the cooldown elapses
    CoolingDown,
}

impl DevicePhase {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Failing => "failing",
            Self::CoolingDown => "cooling_down",
        }
    }
}

/// Sync state of one mapped device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceSyncStatus {
    pub label: String,
    pub address: String,
    pub output_id: i64,
    /// Power state the device last reported, `None` until the first successful push
    pub last_pushed: Option<bool>,
    pub failure_count: u32,
    pub phase: DevicePhase,
    pub cooldown_until: Option<DateTime<Utc>>,
}

/// Sync state of every mapped device, in registry order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncStatusReport {
    pub enabled: bool,
    /// Bumped on every reconfiguration
    pub generation: u64,
    pub devices: Vec<DeviceSyncStatus>,
}
