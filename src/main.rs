use std::sync::Arc;

use anyhow::Result;
use axisgate::{
    config::{config_path, load_config, save_default_config},
    gateway::AxisGateway,
    logging,
    socket_server::SocketServer,
};
use tracing::info;

fn should_create_config() -> bool {
    std::env::var("CREATE_CONFIG")
        .map(|val| val == "1" || val.to_lowercase() == "true")
        .unwrap_or(false)
}

#[tokio::main]
async fn main() -> Result<()> {
    if should_create_config() {
        save_default_config(config_path())?;
    }

    let config = load_config().map_err(|e| {
        eprintln!("Failed to load configuration: {:#}", e);
        eprintln!("Run with CREATE_CONFIG=1 to write a default configuration file.");
        e
    })?;
    logging::init(&config.logging);

    let gateway = Arc::new(AxisGateway::from_config(&config)?);
    let status = gateway.start().await;
    info!(
        primary = status.primary_connected,
        secondary = status.secondary_connected,
        axes = gateway.registry().len(),
        "gateway started"
    );

    let mut socket_server = SocketServer::new(config.server.clone(), gateway.clone());
    socket_server.start().await?;

    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    socket_server.shutdown().await?;
    gateway.shutdown().await;

    Ok(())
}
