//! HTTP client construction shared by the device updater and the output source.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;

/// `X-Requested-With` value attached to every request the bridge makes.
pub const REQUESTED_WITH_VALUE: &str = "Tasmota bridge";

/// Default per-request timeout. A hanging device delays every later device
/// in the same tick, so this stays short.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Create an HTTP client with the given timeout and the identifying header.
///
/// The timeout is clamped to at least one second; an unbounded request would
/// stall the loop.
pub fn create_client(timeout_secs: u64) -> Result<Client, String> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static(REQUESTED_WITH_VALUE),
    );

    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .connect_timeout(Duration::from_secs(timeout_secs.clamp(1, 5)))
        .tcp_nodelay(true)
        .default_headers(headers)
        .build()
        .map_err(|e| format!("HTTP client builder failed: {e}"))
}
