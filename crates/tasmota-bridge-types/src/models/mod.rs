//! Domain models for Tasmota Bridge.

mod config;
mod description;
mod output;
mod status;

pub use config::{
    BridgeConfig, DeviceMappingConfig, DEFAULT_CLEAR_INTERVAL, DEFAULT_MAX_RETRIES,
    DEFAULT_REFRESH_INTERVAL,
};
pub use description::{ConfigField, CONFIG_DESCRIPTION};
pub use output::{OutputSnapshot, OutputStatus};
pub use status::{DevicePhase, DeviceSyncStatus, SyncStatusReport};
