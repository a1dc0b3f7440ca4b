//! Device Mapping Registry
//!
//! Immutable table of the mappings that take part in sync, built from the
//! configured `tasmota_mapping` entries. A new registry is built on every
//! reconfiguration; it is never edited in place.

use std::collections::HashMap;
use std::fmt;

use tasmota_bridge_types::DeviceMappingConfig;
use tracing::{debug, warn};

/// Query-string credentials for a device.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// One device that mirrors one output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceMapping {
    pub label: String,
    pub address: String,
    pub credentials: Option<Credentials>,
    pub output_id: i64,
}

impl DeviceMapping {
    pub fn new(label: impl Into<String>, address: impl Into<String>, output_id: i64) -> Self {
        Self { label: label.into(), address: address.into(), credentials: None, output_id }
    }

    fn from_config(entry: &DeviceMappingConfig, output_id: i64) -> Self {
        let credentials = if entry.username.is_empty() && entry.password.is_empty() {
            None
        } else {
            Some(Credentials { username: entry.username.clone(), password: entry.password.clone() })
        };
        Self {
            label: entry.label.clone(),
            address: entry.ip_address.trim().to_string(),
            credentials,
            output_id,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    mappings: Vec<DeviceMapping>,
    by_output: HashMap<i64, usize>,
    by_label: HashMap<String, usize>,
}

impl DeviceRegistry {
    /// Build the registry from config entries.
    ///
    /// Entries without an integer `output_id` are left out. When two entries
    /// share an output id the later one replaces the earlier one, keeping the
    /// earlier one's position.
    pub fn build(entries: &[DeviceMappingConfig]) -> Self {
        let mut registry = Self::default();

        for entry in entries {
            let Some(output_id) = entry.output_id() else {
                debug!(label = %entry.label, "[Config] Skipping mapping without integer output_id");
                continue;
            };
            let mapping = DeviceMapping::from_config(entry, output_id);

            if let Some(&slot) = registry.by_output.get(&output_id) {
                warn!(
                    output_id,
                    replaced = %registry.mappings[slot].label,
                    by = %mapping.label,
                    "[Config] Duplicate output_id, last mapping wins"
                );
                registry.by_label.retain(|_, idx| *idx != slot);
                registry.by_label.insert(mapping.label.clone(), slot);
                registry.mappings[slot] = mapping;
            } else {
                let slot = registry.mappings.len();
                registry.by_output.insert(output_id, slot);
                registry.by_label.insert(mapping.label.clone(), slot);
                registry.mappings.push(mapping);
            }
        }

        registry
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Mappings in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceMapping> {
        self.mappings.iter()
    }

    pub fn output_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.mappings.iter().map(|m| m.output_id)
    }

    pub fn get(&self, output_id: i64) -> Option<&DeviceMapping> {
        self.by_output.get(&output_id).map(|&idx| &self.mappings[idx])
    }

    pub fn get_by_label(&self, label: &str) -> Option<&DeviceMapping> {
        self.by_label.get(label).map(|&idx| &self.mappings[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(label: &str, ip: &str, output_id: serde_json::Value) -> DeviceMappingConfig {
        DeviceMappingConfig {
            label: label.to_string(),
            ip_address: ip.to_string(),
            username: String::new(),
            password: String::new(),
            output_id: Some(output_id),
        }
    }

    #[test]
    fn test_build_keeps_config_order() {
        let registry = DeviceRegistry::build(&[
            DeviceMappingConfig::new("lamp", "10.0.0.5", 3),
            DeviceMappingConfig::new("fan", "10.0.0.6", 1),
        ]);

        let labels: Vec<_> = registry.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, ["lamp", "fan"]);
        assert_eq!(registry.get(1).map(|m| m.address.as_str()), Some("10.0.0.6"));
        assert_eq!(registry.get_by_label("lamp").map(|m| m.output_id), Some(3));
    }

    #[test]
    fn test_build_skips_non_integer_output_ids() {
        let mut missing = DeviceMappingConfig::new("ghost", "10.0.0.9", 0);
        missing.output_id = None;

        let registry = DeviceRegistry::build(&[
            entry("text", "10.0.0.7", serde_json::json!("4")),
            entry("float", "10.0.0.8", serde_json::json!(4.5)),
            missing,
            DeviceMappingConfig::new("lamp", "10.0.0.5", 3),
        ]);

        assert_eq!(registry.len(), 1);
        assert!(registry.get_by_label("text").is_none());
        assert_eq!(registry.output_ids().collect::<Vec<_>>(), [3]);
    }

    #[test]
    fn test_duplicate_output_id_last_wins() {
        let registry = DeviceRegistry::build(&[
            DeviceMappingConfig::new("lamp", "10.0.0.5", 3),
            DeviceMappingConfig::new("fan", "10.0.0.6", 7),
            DeviceMappingConfig::new("heater", "10.0.0.8", 3),
        ]);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(3).map(|m| m.label.as_str()), Some("heater"));
        assert!(registry.get_by_label("lamp").is_none());
        let labels: Vec<_> = registry.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, ["heater", "fan"]);
    }

    #[test]
    fn test_credentials_only_when_configured() {
        let registry = DeviceRegistry::build(&[
            DeviceMappingConfig::new("open", "10.0.0.5", 1),
            DeviceMappingConfig::new("locked", "10.0.0.6", 2).with_credentials("admin", "secret"),
        ]);

        assert!(registry.get(1).and_then(|m| m.credentials.as_ref()).is_none());
        let creds = registry.get(2).and_then(|m| m.credentials.clone());
        assert_eq!(creds.as_ref().map(|c| c.username.as_str()), Some("admin"));
        assert!(!format!("{:?}", creds).contains("secret"));
    }

    #[test]
    fn test_empty_config_builds_empty_registry() {
        let registry = DeviceRegistry::build(&[]);
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }
}
