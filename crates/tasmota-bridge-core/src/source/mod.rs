//! Output state source: where the authoritative on/off states come from.

mod http;

pub use http::HttpOutputSource;

use async_trait::async_trait;
use tasmota_bridge_types::OutputSnapshot;

use crate::error::FetchError;

#[async_trait]
pub trait OutputStateSource: Send + Sync {
    /// Snapshot of every output's current state.
    ///
    /// A payload without a `status` list is [`FetchError::MissingStatus`].
    async fn fetch(&self) -> Result<OutputSnapshot, FetchError>;
}
