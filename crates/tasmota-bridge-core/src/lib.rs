//! # Tasmota Bridge Core
//!
//! Mirrors the on/off state of controller outputs onto Tasmota power
//! switches over HTTP.
//!
//! ```text
//! tasmota-bridge-core/src/
//! ├── sync/      # registry, retry state machine, reconciliation loop, config interface
//! ├── device/    # DeviceUpdater trait + Tasmota HTTP client
//! ├── source/    # OutputStateSource trait + HTTP poller
//! ├── modules/   # config persistence
//! └── utils/     # HTTP client builder
//! ```

#![allow(
    clippy::significant_drop_tightening,
    reason = "parking_lot guards are scoped to single statements"
)]
#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used))]

pub mod device;
pub mod error;
pub mod modules;
pub mod source;
pub mod sync;
pub mod utils;

pub use device::{DeviceUpdater, TasmotaClient};
pub use error::{FetchError, UpdateError, UpdateResult};
pub use modules::config::{ConfigStore, JsonFileConfigStore, MemoryConfigStore};
pub use source::{HttpOutputSource, OutputStateSource};
pub use sync::{Reconciler, SyncController, TickOutcome, TickReport};
