use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::form_urlencoded::byte_serialize;

use super::DeviceUpdater;
use crate::error::{UpdateError, UpdateResult};
use crate::sync::DeviceMapping;
use crate::utils::http::create_client;

/// Body of a Tasmota `cm?cmnd=Power` response: `{"POWER":"ON"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PowerResponse {
    #[serde(rename = "POWER")]
    pub power: serde_json::Value,
}

impl PowerResponse {
    /// Only the exact string `"ON"` counts as on.
    pub fn is_on(&self) -> bool {
        self.power.as_str() == Some("ON")
    }
}

/// [`DeviceUpdater`] speaking the Tasmota HTTP command API.
#[derive(Debug, Clone)]
pub struct TasmotaClient {
    client: Client,
}

impl TasmotaClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self, String> {
        create_client(timeout_secs).map(Self::new)
    }

    /// `http://{address}/cm?user=..&password=..&cmnd=Power%20{1|0}`.
    ///
    /// `user`/`password` are only sent when the mapping has credentials.
    pub fn command_url(mapping: &DeviceMapping, desired: bool) -> String {
        let action = u8::from(desired);
        let auth = mapping
            .credentials
            .as_ref()
            .map(|c| {
                format!(
                    "user={}&password={}&",
                    byte_serialize(c.username.as_bytes()).collect::<String>(),
                    byte_serialize(c.password.as_bytes()).collect::<String>()
                )
            })
            .unwrap_or_default();
        format!("http://{}/cm?{}cmnd=Power%20{}", mapping.address, auth, action)
    }
}

#[async_trait]
impl DeviceUpdater for TasmotaClient {
    async fn push(&self, mapping: &DeviceMapping, desired: bool) -> UpdateResult<bool> {
        let address = mapping.address.clone();
        let url = Self::command_url(mapping, desired);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| UpdateError::Transport { address: address.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::Status { address, status: status.as_u16() });
        }

        let body: PowerResponse = response.json().await.map_err(|e| {
            if e.is_decode() {
                UpdateError::InvalidResponse { address: address.clone(), message: e.to_string() }
            } else {
                UpdateError::Transport { address: address.clone(), source: e }
            }
        })?;

        tracing::debug!(
            label = %mapping.label,
            address = %address,
            power = %body.power,
            "[Device] Tasmota device answered"
        );
        Ok(body.is_on())
    }
}
