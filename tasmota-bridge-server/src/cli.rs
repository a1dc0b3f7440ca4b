use std::net::IpAddr;

use clap::{Parser, Subcommand};
use tasmota_bridge_core::utils::http::DEFAULT_TIMEOUT_SECS;

#[derive(Parser)]
#[command(
    name = "tasmota-bridge",
    about = "Tasmota Bridge - mirror controller outputs onto Tasmota power switches",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, env = "TASMOTA_BRIDGE_PORT", default_value = "8046", global = true)]
    pub port: u16,

    #[arg(long, env = "TASMOTA_BRIDGE_BIND", default_value = "127.0.0.1", global = true)]
    pub bind: IpAddr,

    #[arg(
        long,
        env = "TASMOTA_BRIDGE_OUTPUT_URL",
        default_value = "http://127.0.0.1/get_output_status",
        help = "Endpoint answering {\"status\": [{\"id\", \"status\"}, ...]}"
    )]
    pub output_url: String,

    #[arg(
        long,
        env = "TASMOTA_BRIDGE_DEVICE_TIMEOUT",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        help = "HTTP timeout in seconds for device and output requests"
    )]
    pub device_timeout: u64,

    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the sync daemon (default if no command specified)")]
    Serve,

    #[command(subcommand, about = "View and modify the stored configuration")]
    Config(ConfigCommands),

    #[command(about = "Show per-device sync state of a running daemon")]
    Status {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show current configuration")]
    Show {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "List configuration fields")]
    Describe,

    #[command(about = "Set a configuration value")]
    Set {
        #[arg(help = "Configuration key (refresh_interval, max_retries, clear_interval)")]
        key: String,

        #[arg(help = "New value")]
        value: String,
    },
}
