//! Device Updater
//!
//! Pushes a desired power state to one device and returns the state the
//! device reports back. One request per call; retry policy lives in the
//! reconciliation loop.

mod tasmota;

pub use tasmota::{PowerResponse, TasmotaClient};

use async_trait::async_trait;

use crate::error::UpdateResult;
use crate::sync::DeviceMapping;

#[async_trait]
pub trait DeviceUpdater: Send + Sync {
    /// Switch the device to `desired`. The returned value is the device's
    /// reported state, which may differ from `desired`.
    async fn push(&self, mapping: &DeviceMapping, desired: bool) -> UpdateResult<bool>;
}
