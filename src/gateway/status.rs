use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{axis::snapshot::AxisSnapshot, command::Channel};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub primary_connected: bool,
    pub secondary_connected: bool,
    /// True when requests are currently served by the simulation.
    pub simulated: bool,
    pub observed_at: DateTime<Utc>,
}

impl SystemStatus {
    pub fn new(primary_connected: bool, secondary_connected: bool) -> Self {
        Self {
            primary_connected,
            secondary_connected,
            simulated: !primary_connected && !secondary_connected,
            observed_at: Utc::now(),
        }
    }
}

/// Axis snapshots together with the channel that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisReadout {
    pub channel: Channel,
    pub axes: Vec<AxisSnapshot>,
}
