use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::transport::SyntheticTransport;

/// Parameters for the synthetic transport used in place of a fieldbus stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub reachable: bool,
    pub connect_latency_ms: u64,
    pub io_latency_ms: u64,
}

impl SyntheticConfig {
    pub fn transport(&self) -> SyntheticTransport {
        SyntheticTransport::new(
            self.reachable,
            Duration::from_millis(self.connect_latency_ms),
            Duration::from_millis(self.io_latency_ms),
        )
    }
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            reachable: true,
            connect_latency_ms: 50,
            io_latency_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdsConfig {
    pub enabled: bool,
    pub name: String,
    pub ams_net_id: String,
    pub port: u16,
    pub connect_timeout_ms: u64,
    pub io_timeout_ms: u64,
    pub synthetic: SyntheticConfig,
}

impl AdsConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }
}

impl Default for AdsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: "ads".to_string(),
            ams_net_id: "127.0.0.1.1.1".to_string(),
            port: 851,
            connect_timeout_ms: 2000,
            io_timeout_ms: 500,
            synthetic: SyntheticConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpcUaConfig {
    pub enabled: bool,
    pub name: String,
    pub endpoint: String,
    pub namespace: String,
    pub connect_timeout_ms: u64,
    pub io_timeout_ms: u64,
    pub synthetic: SyntheticConfig,
}

impl OpcUaConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }
}

impl Default for OpcUaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: "opcua".to_string(),
            endpoint: "opc.tcp://localhost:4840".to_string(),
            namespace: "ns=2;s=Machine".to_string(),
            connect_timeout_ms: 2000,
            io_timeout_ms: 500,
            synthetic: SyntheticConfig::default(),
        }
    }
}
