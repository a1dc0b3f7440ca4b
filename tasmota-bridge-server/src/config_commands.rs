use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use tasmota_bridge_core::{ConfigStore, JsonFileConfigStore, SyncController};
use tasmota_bridge_types::{BridgeConfig, ConfigField, CONFIG_DESCRIPTION};

fn open_store() -> Result<Arc<JsonFileConfigStore>> {
    let store = JsonFileConfigStore::in_data_dir().map_err(|e| anyhow::anyhow!(e))?;
    Ok(Arc::new(store))
}

pub async fn show_config(json: bool) -> Result<()> {
    let config = open_store()?.load().await?.unwrap_or_default();

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{}", "Bridge Configuration:".cyan().bold());
    println!("  Refresh interval: {}s", config.refresh_interval);
    println!("  Max retries: {}", config.max_retries);
    println!("  Clear interval: {}m", config.clear_interval);

    if config.tasmota_mapping.is_empty() {
        println!("\n{}", "No Tasmota mappings configured, sync is disabled.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Label", "Address", "Output", "Auth"]);
    for mapping in &config.tasmota_mapping {
        let output = mapping.output_id().map_or_else(
            || Cell::new("invalid").fg(Color::Red),
            |id| Cell::new(id.to_string()),
        );
        let auth = if mapping.username.is_empty() && mapping.password.is_empty() {
            "-"
        } else {
            "yes"
        };
        table.add_row(vec![
            Cell::new(&mapping.label),
            Cell::new(&mapping.ip_address),
            output,
            Cell::new(auth),
        ]);
    }
    println!("\n{table}");
    Ok(())
}

pub fn describe_config() {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Key", "Type", "Description"]);
    add_fields(&mut table, "", CONFIG_DESCRIPTION);
    println!("{table}");
}

fn add_fields(table: &mut Table, prefix: &str, fields: &[ConfigField]) {
    for field in fields {
        let key = format!("{prefix}{}", field.name);
        table.add_row(vec![
            Cell::new(&key),
            Cell::new(field.field_type),
            Cell::new(field.description),
        ]);
        if let Some(content) = field.content {
            add_fields(table, &format!("{key}[]."), content);
        }
    }
}

/// Validate and persist a scalar key through the same path as `POST /api/config`.
pub async fn set_config_value(key: &str, value: &str) -> Result<()> {
    let controller = SyncController::load(open_store()?).await?;
    let mut config = controller.get();
    apply_value(&mut config, key, value)?;
    controller.set(config).await?;

    println!("{} Config updated: {} = {}", "✓".green(), key, value);
    println!("{}", "A running daemon keeps its config until restarted.".dimmed());
    Ok(())
}

fn apply_value(config: &mut BridgeConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "refresh_interval" => config.refresh_interval = parse(key, value)?,
        "max_retries" => config.max_retries = parse(key, value)?,
        "clear_interval" => config.clear_interval = parse(key, value)?,
        "tasmota_mapping" => {
            anyhow::bail!("tasmota_mapping is a list, edit it through POST /api/config")
        },
        _ => anyhow::bail!("Unknown config key: {}", key),
    }
    Ok(())
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| anyhow::anyhow!("Invalid value for {}: {}", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_value_scalars() {
        let mut config = BridgeConfig::default();
        apply_value(&mut config, "refresh_interval", "12").expect("valid");
        apply_value(&mut config, "max_retries", "0").expect("valid");
        apply_value(&mut config, "clear_interval", "1").expect("valid");
        assert_eq!(config.refresh_interval, 12);
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.clear_interval, 1);
    }

    #[test]
    fn test_apply_value_rejects_bad_input() {
        let mut config = BridgeConfig::default();
        assert!(apply_value(&mut config, "max_retries", "-1").is_err());
        assert!(apply_value(&mut config, "tasmota_mapping", "[]").is_err());
        assert!(apply_value(&mut config, "port", "80").is_err());
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_describe_flattens_mapping_section() {
        let mut table = Table::new();
        add_fields(&mut table, "", CONFIG_DESCRIPTION);
        let rendered = table.to_string();
        assert!(rendered.contains("tasmota_mapping[].ip_address"));
        assert!(rendered.contains("password"));
    }
}
