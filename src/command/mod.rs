pub mod translator;

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gateway::error::GatewayError;

/// Value written for commands that carry no explicit value.
pub const DEFAULT_COMMAND_VALUE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnifiedCommand {
    Enable,
    Disable,
    Home,
    Stop,
    MoveTo,
    Jog,
}

impl UnifiedCommand {
    pub const ALL: [UnifiedCommand; 6] = [
        UnifiedCommand::Enable,
        UnifiedCommand::Disable,
        UnifiedCommand::Home,
        UnifiedCommand::Stop,
        UnifiedCommand::MoveTo,
        UnifiedCommand::Jog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnifiedCommand::Enable => "enable",
            UnifiedCommand::Disable => "disable",
            UnifiedCommand::Home => "home",
            UnifiedCommand::Stop => "stop",
            UnifiedCommand::MoveTo => "moveTo",
            UnifiedCommand::Jog => "jog",
        }
    }
}

impl fmt::Display for UnifiedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnifiedCommand {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| GatewayError::UnknownCommand(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    pub axis_id: String,
    pub command: UnifiedCommand,
    pub value: Option<f64>,
}

impl CommandRequest {
    pub fn new(axis_id: impl Into<String>, command: UnifiedCommand, value: Option<f64>) -> Self {
        Self {
            axis_id: axis_id.into(),
            command,
            value,
        }
    }

    /// Parses the wire name of the command, failing on anything outside the
    /// unified vocabulary.
    pub fn parse(
        axis_id: impl Into<String>,
        command: &str,
        value: Option<f64>,
    ) -> Result<Self, GatewayError> {
        Ok(Self::new(axis_id, command.parse()?, value))
    }

    pub fn write_value(&self) -> f64 {
        self.value.unwrap_or(DEFAULT_COMMAND_VALUE)
    }
}

/// Member of the failover chain that served a request, in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    PrimaryProtocol,
    SecondaryProtocol,
    Simulated,
}

impl Channel {
    pub fn is_simulated(&self) -> bool {
        *self == Channel::Simulated
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub request_id: Uuid,
    #[serde(rename = "axisID")]
    pub axis_id: String,
    pub command: UnifiedCommand,
    pub value: Option<f64>,
    pub succeeded: bool,
    pub channel: Channel,
    /// Set when no real backend actuated the command.
    pub degraded: bool,
    pub observed_at: DateTime<Utc>,
}

impl CommandResult {
    pub fn served(request: CommandRequest, channel: Channel) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            axis_id: request.axis_id,
            command: request.command,
            value: request.value,
            succeeded: true,
            channel,
            degraded: channel.is_simulated(),
            observed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wire_names() {
        for command in UnifiedCommand::ALL {
            assert_eq!(command.as_str().parse::<UnifiedCommand>().unwrap(), command);
        }
    }

    #[test]
    fn test_unknown_command_rejected() {
        let err = "teleport".parse::<UnifiedCommand>().unwrap_err();
        assert!(matches!(err, GatewayError::UnknownCommand(ref c) if c == "teleport"));
        // wire names are case sensitive
        assert!("MoveTo".parse::<UnifiedCommand>().is_err());
    }

    #[test]
    fn test_write_value_defaults_to_pulse() {
        let request = CommandRequest::new("axis1", UnifiedCommand::Home, None);
        assert_eq!(request.write_value(), 1.0);

        let request = CommandRequest::new("axis1", UnifiedCommand::MoveTo, Some(42.0));
        assert_eq!(request.write_value(), 42.0);
    }

    #[test]
    fn test_result_serializes_wire_names() {
        let request = CommandRequest::new("axis1", UnifiedCommand::MoveTo, Some(42.0));
        let result = CommandResult::served(request, Channel::PrimaryProtocol);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["axisID"], "axis1");
        assert_eq!(json["command"], "moveTo");
        assert_eq!(json["value"], 42.0);
        assert_eq!(json["succeeded"], true);
        assert_eq!(json["channel"], "PrimaryProtocol");
        assert_eq!(json["degraded"], false);
    }

    #[test]
    fn test_simulated_result_is_degraded() {
        let request = CommandRequest::new("axis1", UnifiedCommand::Stop, None);
        let result = CommandResult::served(request, Channel::Simulated);
        assert!(result.succeeded);
        assert!(result.degraded);
    }
}
