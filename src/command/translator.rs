use serde::{Deserialize, Serialize};

use super::UnifiedCommand;
use crate::axis::Axis;

pub const POSITION: &str = "Position";
pub const TARGET_POSITION: &str = "TargetPosition";
pub const VELOCITY: &str = "Velocity";
pub const STATUS: &str = "Status";
pub const ENABLED: &str = "Enabled";
pub const ERROR_CODE: &str = "ErrorCode";
pub const ERROR_MESSAGE: &str = "ErrorMessage";

/// How a protocol spells the address of an axis variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AddressScheme {
    /// `{prefix}.{Variable}`, using the axis' configured address prefix.
    Prefixed,
    /// `{namespace}:{axisID}.{Variable}`.
    Namespaced { namespace: String },
}

impl AddressScheme {
    pub fn address(&self, axis: &Axis, variable: &str) -> String {
        match self {
            AddressScheme::Prefixed => format!("{}.{}", axis.address_prefix, variable),
            AddressScheme::Namespaced { namespace } => {
                format!("{}:{}.{}", namespace, axis.id, variable)
            }
        }
    }
}

/// Per-protocol table from the unified command vocabulary to variable
/// addresses.
#[derive(Debug, Clone)]
pub struct CommandTranslator {
    scheme: AddressScheme,
}

impl CommandTranslator {
    pub fn new(scheme: AddressScheme) -> Self {
        Self { scheme }
    }

    pub fn variable(command: UnifiedCommand) -> &'static str {
        match command {
            UnifiedCommand::Enable => "Enable",
            UnifiedCommand::Disable => "Disable",
            UnifiedCommand::Home => "Home",
            UnifiedCommand::Stop => "Stop",
            UnifiedCommand::MoveTo => TARGET_POSITION,
            UnifiedCommand::Jog => "Jog",
        }
    }

    pub fn translate(&self, axis: &Axis, command: UnifiedCommand) -> String {
        self.scheme.address(axis, Self::variable(command))
    }

    pub fn address(&self, axis: &Axis, variable: &str) -> String {
        self.scheme.address(axis, variable)
    }
}
