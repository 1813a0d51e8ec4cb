use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    axis::{default_axes, Axis},
    gateway::config::GatewayConfig,
    logging::LoggingConfig,
    protocol_client::config::{AdsConfig, OpcUaConfig},
    socket_server::config::SocketServerConfig,
};

pub const CONFIG_PATH_ENV: &str = "AXISGATE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "axisgate.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub axes: Vec<Axis>,
    pub primary: AdsConfig,
    pub secondary: OpcUaConfig,
    pub gateway: GatewayConfig,
    pub server: SocketServerConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            axes: default_axes(),
            primary: AdsConfig::default(),
            secondary: OpcUaConfig::default(),
            gateway: GatewayConfig::default(),
            server: SocketServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Loads the configuration from `AXISGATE_CONFIG` (or `axisgate.toml`).
/// A missing file yields the defaults; a malformed one is an error.
pub fn load_config() -> anyhow::Result<Config> {
    load_config_from(config_path())
}

pub fn load_config_from(path: impl AsRef<Path>) -> anyhow::Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        // logging is configured from this file, so it is not up yet
        eprintln!(
            "Config file '{}' not found, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

pub fn save_default_config(path: impl AsRef<Path>) -> anyhow::Result<()> {
    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(path.as_ref(), content)
        .with_context(|| format!("Failed to write config file '{}'", path.as_ref().display()))
}
