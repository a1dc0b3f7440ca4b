//! Bridge configuration.
//!
//! The persisted shape matches the `config_description` schema exactly:
//! `refresh_interval` (seconds), `max_retries`, `clear_interval` (minutes)
//! and a repeated `tasmota_mapping` section.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ConfigError;

pub const DEFAULT_REFRESH_INTERVAL: u64 = 5;
pub const DEFAULT_MAX_RETRIES: u32 = 20;
pub const DEFAULT_CLEAR_INTERVAL: u64 = 30;

/// Full bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct BridgeConfig {
    /// Seconds between two reconciliation ticks
    #[serde(default = "default_refresh_interval")]
    #[validate(range(min = 1_u64))]
    pub refresh_interval: u64,
    /// Consecutive failed pushes tolerated before a device is put on cooldown
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Cooldown length in minutes
    #[serde(default = "default_clear_interval")]
    pub clear_interval: u64,
    /// Output-to-device mappings
    #[serde(default)]
    #[validate(nested)]
    pub tasmota_mapping: Vec<DeviceMappingConfig>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            max_retries: DEFAULT_MAX_RETRIES,
            clear_interval: DEFAULT_CLEAR_INTERVAL,
            tasmota_mapping: Vec::new(),
        }
    }
}

impl BridgeConfig {
    /// Validate against the config schema.
    ///
    /// Runs the derived field rules, then the cross-field rules: every
    /// `output_id` must be an integer, and outputs and labels are unique
    /// across mappings.
    pub fn check(&self) -> Result<(), ConfigError> {
        if let Err(errors) = self.validate() {
            let field = errors
                .errors()
                .keys()
                .next()
                .map_or_else(|| "config".to_string(), ToString::to_string);
            return Err(ConfigError::invalid(field, errors.to_string()));
        }

        let mut seen = HashSet::new();
        let mut labels = HashSet::new();
        for (idx, mapping) in self.tasmota_mapping.iter().enumerate() {
            if !labels.insert(mapping.label.as_str()) {
                return Err(ConfigError::invalid(
                    format!("tasmota_mapping[{idx}].label"),
                    format!("label '{}' is already used by another mapping", mapping.label),
                ));
            }
            let Some(output_id) = mapping.output_id() else {
                return Err(ConfigError::invalid(
                    format!("tasmota_mapping[{idx}].output_id"),
                    format!("mapping '{}' needs an integer output_id", mapping.label),
                ));
            };
            if !seen.insert(output_id) {
                return Err(ConfigError::invalid(
                    format!("tasmota_mapping[{idx}].output_id"),
                    format!("output {output_id} is already mapped to another device"),
                ));
            }
        }
        Ok(())
    }

    /// Sync runs only when at least one mapping is configured.
    pub fn has_mappings(&self) -> bool {
        !self.tasmota_mapping.is_empty()
    }
}

/// One configured output-to-device pair.
///
/// `output_id` is kept as raw JSON: a stored config whose id is not an
/// integer still loads and round-trips through `get_config`, the registry
/// just leaves it out of sync.
#[derive(Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct DeviceMappingConfig {
    /// Name to identify the (ip_address, output_id) pair
    #[validate(length(min = 1_u64))]
    pub label: String,
    /// Device host or IP address, optionally with `:port`
    #[validate(length(min = 1_u64))]
    pub ip_address: String,
    /// Device username, empty when authentication is disabled
    #[serde(default)]
    pub username: String,
    /// Device password, empty when authentication is disabled
    #[serde(default)]
    pub password: String,
    /// Output id to mirror
    #[serde(default)]
    pub output_id: Option<serde_json::Value>,
}

impl DeviceMappingConfig {
    pub fn new(label: impl Into<String>, ip_address: impl Into<String>, output_id: i64) -> Self {
        Self {
            label: label.into(),
            ip_address: ip_address.into(),
            username: String::new(),
            password: String::new(),
            output_id: Some(serde_json::Value::from(output_id)),
        }
    }

    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// The output id, if it is a well-formed integer.
    pub fn output_id(&self) -> Option<i64> {
        self.output_id.as_ref().and_then(serde_json::Value::as_i64)
    }
}

impl fmt::Debug for DeviceMappingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceMappingConfig")
            .field("label", &self.label)
            .field("ip_address", &self.ip_address)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("output_id", &self.output_id)
            .finish()
    }
}

const fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL
}

const fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

const fn default_clear_interval() -> u64 {
    DEFAULT_CLEAR_INTERVAL
}
