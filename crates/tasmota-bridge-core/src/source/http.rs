use async_trait::async_trait;
use reqwest::Client;
use tasmota_bridge_types::OutputSnapshot;

use super::OutputStateSource;
use crate::error::FetchError;

/// Polls a controller endpoint that answers with `{"status": [{"id", "status"}, ...]}`.
#[derive(Debug, Clone)]
pub struct HttpOutputSource {
    client: Client,
    url: String,
}

impl HttpOutputSource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl OutputStateSource for HttpOutputSource {
    async fn fetch(&self) -> Result<OutputSnapshot, FetchError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let payload: serde_json::Value = serde_json::from_slice(&bytes)?;
        OutputSnapshot::from_value(payload)?.ok_or(FetchError::MissingStatus)
    }
}
