use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::AxisStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisSnapshot {
    #[serde(rename = "axisID")]
    pub axis_id: String,
    pub display_name: String,
    pub position: f64,
    pub target_position: f64,
    pub velocity: f64,
    pub status: AxisStatus,
    pub enabled: bool,
    pub error_code: i64,
    pub error_message: String,
    pub observed_at: DateTime<Utc>,
}

impl AxisSnapshot {
    pub fn new(axis_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            axis_id: axis_id.into(),
            display_name: display_name.into(),
            position: 0.0,
            target_position: 0.0,
            velocity: 0.0,
            status: AxisStatus::Idle,
            enabled: false,
            error_code: 0,
            error_message: String::new(),
            observed_at: Utc::now(),
        }
    }

    pub fn with_motion(mut self, position: f64, target_position: f64, velocity: f64) -> Self {
        self.position = position;
        self.target_position = target_position;
        self.velocity = velocity;
        self
    }

    pub fn with_status(mut self, status: AxisStatus, enabled: bool) -> Self {
        self.status = status;
        self.enabled = enabled;
        self
    }

    pub fn with_error(mut self, code: i64, message: impl Into<String>) -> Self {
        self.error_code = code;
        self.error_message = message.into();
        self
    }

    pub fn has_error(&self) -> bool {
        self.error_code != 0
    }
}
