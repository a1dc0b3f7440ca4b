use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use tasmota_bridge_types::{DevicePhase, SyncStatusReport};

use crate::cli::ConfigCommands;
use crate::config_commands;

pub async fn handle_config_command(cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show { json } => config_commands::show_config(json).await,
        ConfigCommands::Describe => {
            config_commands::describe_config();
            Ok(())
        },
        ConfigCommands::Set { key, value } => {
            config_commands::set_config_value(&key, &value).await
        },
    }
}

/// Query the sync state of the daemon listening on `bind:port`.
pub async fn handle_status(bind: IpAddr, port: u16, json: bool) -> Result<()> {
    let url = status_url(bind, port);
    let response = reqwest::get(&url)
        .await
        .with_context(|| format!("Failed to reach daemon at {url}, is it running?"))?
        .error_for_status()?;
    let report: SyncStatusReport = response.json().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Tasmota Bridge Status".cyan().bold());
    if !report.enabled {
        println!("{}", "  Sync is disabled, no Tasmota mappings configured.".yellow());
        return Ok(());
    }
    println!("  Config generation: {}", report.generation);
    println!("{}", status_table(&report, Utc::now()));
    Ok(())
}

/// A wildcard bind is reached over loopback of the same family.
fn status_url(bind: IpAddr, port: u16) -> String {
    let host = match bind {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    format!("http://{}/api/sync/status", SocketAddr::new(host, port))
}

fn status_table(report: &SyncStatusReport, now: DateTime<Utc>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Label", "Address", "Output", "Last pushed", "Failures", "Phase"]);

    for device in &report.devices {
        let last_pushed = match device.last_pushed {
            Some(true) => "on",
            Some(false) => "off",
            None => "-",
        };
        let phase = match (device.phase, device.cooldown_until) {
            (DevicePhase::CoolingDown, Some(until)) => {
                let minutes = (until - now).num_minutes().max(0);
                Cell::new(format!("cooling down ({minutes}m left)")).fg(Color::Red)
            },
            (DevicePhase::Failing, _) => Cell::new("failing").fg(Color::Yellow),
            (phase, _) => Cell::new(phase.as_str()).fg(Color::Green),
        };

        table.add_row(vec![
            Cell::new(&device.label),
            Cell::new(&device.address),
            Cell::new(device.output_id),
            Cell::new(last_pushed),
            Cell::new(device.failure_count),
            phase,
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tasmota_bridge_types::DeviceSyncStatus;

    #[test]
    fn test_status_url_follows_bind_address() {
        let lan: IpAddr = "192.168.1.20".parse().unwrap();
        assert_eq!(status_url(lan, 8046), "http://192.168.1.20:8046/api/sync/status");

        let any_v4: IpAddr = "0.0.0.0".parse().unwrap();
        assert_eq!(status_url(any_v4, 9000), "http://127.0.0.1:9000/api/sync/status");

        let any_v6: IpAddr = "::".parse().unwrap();
        assert_eq!(status_url(any_v6, 9000), "http://[::1]:9000/api/sync/status");

        let v6: IpAddr = "fd00::5".parse().unwrap();
        assert_eq!(status_url(v6, 8046), "http://[fd00::5]:8046/api/sync/status");
    }

    #[test]
    fn test_status_table_shows_cooldown_remaining() {
        let now = Utc::now();
        let report = SyncStatusReport {
            enabled: true,
            generation: 2,
            devices: vec![
                DeviceSyncStatus {
                    label: "lamp".to_string(),
                    address: "10.0.0.5".to_string(),
                    output_id: 3,
                    last_pushed: Some(true),
                    failure_count: 0,
                    phase: DevicePhase::Active,
                    cooldown_until: None,
                },
                DeviceSyncStatus {
                    label: "fan".to_string(),
                    address: "10.0.0.6".to_string(),
                    output_id: 4,
                    last_pushed: None,
                    failure_count: 21,
                    phase: DevicePhase::CoolingDown,
                    cooldown_until: Some(now + Duration::minutes(12) + Duration::seconds(30)),
                },
            ],
        };

        let rendered = status_table(&report, now).to_string();
        assert!(rendered.contains("lamp"));
        assert!(rendered.contains("cooling down (12m left)"));
        assert!(rendered.contains("21"));
    }
}
