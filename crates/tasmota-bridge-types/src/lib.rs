//! # Tasmota Bridge Types
//!
//! Shared type system for the Tasmota Bridge daemon.
//!
//! - **`error`** - Configuration error hierarchy
//! - **`models`** - Config, config description, output snapshots, sync status
//!
//! ## Architecture Role
//!
//! `tasmota-bridge-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!          tasmota-bridge-types (this crate)
//!                     │
//!                     ▼
//!           tasmota-bridge-core
//!                     │
//!                     ▼
//!          tasmota-bridge-server
//! ```

pub mod error;
pub mod models;

pub use error::{ConfigError, Result};

pub use models::{
    BridgeConfig, ConfigField, DeviceMappingConfig, DevicePhase, DeviceSyncStatus, OutputSnapshot,
    OutputStatus, SyncStatusReport, CONFIG_DESCRIPTION,
};
