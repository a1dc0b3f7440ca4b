//! Tasmota Bridge Server - Headless Daemon
//!
//! Polls the controller's output states and mirrors them onto Tasmota power
//! switches, while serving a REST API for configuration on /api/*.

#![allow(clippy::print_stdout, reason = "CLI commands write to stdout")]

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tasmota_bridge_core::utils::http::create_client;
use tasmota_bridge_core::{HttpOutputSource, JsonFileConfigStore, SyncController, TasmotaClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod cli;
mod commands;
mod config_commands;
mod router;
mod server_utils;
mod state;

#[cfg(test)]
mod test_helpers;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command.take() {
        None | Some(Commands::Serve) => run_server(&cli).await,
        Some(Commands::Config(cmd)) => commands::handle_config_command(cmd).await,
        Some(Commands::Status { json }) => {
            commands::handle_status(cli.bind, cli.port, json).await
        },
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

async fn run_server(cli: &Cli) -> Result<()> {
    info!("Tasmota Bridge starting on port {}...", cli.port);

    let store = JsonFileConfigStore::in_data_dir()
        .map_err(|e| anyhow::anyhow!("Failed to get data directory: {}", e))?;
    info!(path = %store.path().display(), "[Config] Using config file");
    let controller = Arc::new(SyncController::load(Arc::new(store)).await?);

    let client = create_client(cli.device_timeout).map_err(anyhow::Error::msg)?;
    let source = HttpOutputSource::new(client.clone(), cli.output_url.clone());
    info!(url = %source.url(), "[Sync] Reading output states");
    let updater = TasmotaClient::new(client);
    let reconciler = controller.reconciler(Arc::new(source), Arc::new(updater));
    let sync_task = tokio::spawn(async move { reconciler.run().await });

    let app = router::build_router(AppState::new(controller));
    let addr = SocketAddr::new(cli.bind, cli.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);
    info!("API available at http://{}/api/", addr);

    axum::serve(listener, app).with_graceful_shutdown(server_utils::shutdown_signal()).await?;

    sync_task.abort();
    info!("Server stopped");
    Ok(())
}
