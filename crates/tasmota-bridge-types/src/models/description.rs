//! Static description of the configuration schema, served by
//! `get_config_description` so a UI can render an edit form.

use serde::Serialize;

/// One field of the configuration schema.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ConfigField {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub field_type: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<&'static [ConfigField]>,
}

impl ConfigField {
    const fn scalar(
        name: &'static str,
        field_type: &'static str,
        description: &'static str,
    ) -> Self {
        Self { name, field_type, description, repeat: None, min: None, content: None }
    }
}

const MAPPING_FIELDS: &[ConfigField] = &[
    ConfigField::scalar("label", "str", "Name to identify pair (ip_address, output_id)"),
    ConfigField::scalar("ip_address", "str", "Device IP Address."),
    ConfigField::scalar(
        "username",
        "str",
        "Device username, fill only if authentication is enabled.",
    ),
    ConfigField::scalar(
        "password",
        "password",
        "Device password, fill only if authentication is enabled.",
    ),
    ConfigField::scalar("output_id", "int", "Output id to sync with the Tasmota device"),
];

/// The complete configuration schema.
pub const CONFIG_DESCRIPTION: &[ConfigField] = &[
    ConfigField::scalar(
        "refresh_interval",
        "int",
        "Refresh interval (in seconds) to fetch values from outputs and push to tasmota devices",
    ),
    ConfigField::scalar(
        "max_retries",
        "int",
        "Maximum amount of retries to push to a tasmota device before it goes idle",
    ),
    ConfigField::scalar(
        "clear_interval",
        "int",
        "Interval (in minutes) to clear maximum retries per output",
    ),
    ConfigField {
        name: "tasmota_mapping",
        field_type: "section",
        description: "Mapping between outputs and Tasmota devices.",
        repeat: Some(true),
        min: Some(0),
        content: Some(MAPPING_FIELDS),
    },
];

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_description_lists_every_config_key() {
        let value = serde_json::to_value(CONFIG_DESCRIPTION).unwrap();
        let names: Vec<&str> =
            value.as_array().unwrap().iter().filter_map(|f| f["name"].as_str()).collect();
        assert_eq!(names, ["refresh_interval", "max_retries", "clear_interval", "tasmota_mapping"]);
    }

    #[test]
    fn test_section_serializes_nested_content() {
        let value = serde_json::to_value(CONFIG_DESCRIPTION).unwrap();
        let section = &value[3];
        assert_eq!(section["type"], "section");
        assert_eq!(section["repeat"], true);
        assert_eq!(section["min"], 0);
        assert_eq!(section["content"].as_array().unwrap().len(), 5);
        assert_eq!(section["content"][3]["type"], "password");
        assert!(value[0].get("content").is_none());
    }
}
