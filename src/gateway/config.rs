use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Upper bound on one channel's attempt at a request before the
    /// failover chain moves on.
    pub attempt_timeout_ms: u64,
    pub reconnect: ReconnectConfig,
}

impl GatewayConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_ms: 2000,
            reconnect: ReconnectConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub enabled: bool,
    pub check_interval_ms: u64,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            check_interval_ms: 1000,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
            jitter_ms: 100,
        }
    }
}
