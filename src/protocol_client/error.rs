use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{client}: connection failed: {reason}")]
    Connection { client: String, reason: String },
    #[error("{client}: not connected")]
    NotConnected { client: String },
    #[error("{client}: {operation} timed out after {timeout:?}")]
    Timeout {
        client: String,
        operation: &'static str,
        timeout: Duration,
    },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("{address}: unexpected {found} value")]
    TypeMismatch { address: String, found: &'static str },
    #[error("unknown variable: {0}")]
    UnknownVariable(String),
}
