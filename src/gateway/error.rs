use thiserror::Error;

/// Errors surfaced to gateway callers. Connectivity problems never appear
/// here; they are absorbed by the failover chain.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Unknown axis: {0}")]
    UnknownAxis(String),
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("Invalid gateway configuration: {0}")]
    Config(String),
}

impl GatewayError {
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::UnknownAxis(_) => "unknown_axis",
            GatewayError::UnknownCommand(_) => "unknown_command",
            GatewayError::Config(_) => "config",
        }
    }
}
