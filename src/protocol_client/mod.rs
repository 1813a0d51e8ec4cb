pub mod ads;
pub mod config;
pub mod error;
pub mod opcua;
pub mod session;
pub mod transport;

use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

use crate::{
    axis::{snapshot::AxisSnapshot, state::AxisStatus, Axis, AxisRegistry},
    command::{
        translator::{
            CommandTranslator, ENABLED, ERROR_CODE, ERROR_MESSAGE, POSITION, STATUS,
            TARGET_POSITION, VELOCITY,
        },
        UnifiedCommand,
    },
};
use error::ClientError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(String),
}

impl VariableValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            VariableValue::Real(v) => Some(*v),
            VariableValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            VariableValue::Int(v) => Some(*v),
            VariableValue::Real(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            VariableValue::Bool(v) => Some(*v),
            VariableValue::Int(v) => Some(*v != 0),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            VariableValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn to_text(&self) -> Option<String> {
        self.as_text().map(str::to_string)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            VariableValue::Bool(_) => "bool",
            VariableValue::Int(_) => "int",
            VariableValue::Real(_) => "real",
            VariableValue::Text(_) => "text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

impl ConnectionState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Failed,
            _ => ConnectionState::Disconnected,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ConnectionState::Disconnected => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Connected => 2,
            ConnectionState::Failed => 3,
        }
    }
}

/// Lock-free holder for a client's connection state.
#[derive(Debug)]
pub struct ConnectionCell(AtomicU8);

impl ConnectionCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(ConnectionState::Disconnected.as_u8()))
    }

    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, state: ConnectionState) {
        self.0.store(state.as_u8(), Ordering::Release);
    }

    /// Stores `state` and returns the state it replaced.
    pub fn swap(&self, state: ConnectionState) -> ConnectionState {
        ConnectionState::from_u8(self.0.swap(state.as_u8(), Ordering::AcqRel))
    }

    /// Moves from `current` to `new` only if the cell still holds `current`.
    /// On failure returns the state actually found.
    pub fn compare_exchange(
        &self,
        current: ConnectionState,
        new: ConnectionState,
    ) -> Result<(), ConnectionState> {
        self.0
            .compare_exchange(
                current.as_u8(),
                new.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(ConnectionState::from_u8)
    }
}

impl Default for ConnectionCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability set shared by every fieldbus backend.
///
/// Implementations own their connection state. `is_connected` must never
/// perform I/O, and every I/O method must fail with
/// [`ClientError::NotConnected`] without touching the transport when the
/// client is not connected.
#[async_trait::async_trait]
pub trait ProtocolClient: Send + Sync {
    fn name(&self) -> &str;

    fn state(&self) -> ConnectionState;

    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    fn registry(&self) -> &AxisRegistry;
    fn translator(&self) -> &CommandTranslator;

    async fn connect(&self) -> Result<(), ClientError>;
    async fn disconnect(&self);

    async fn read_variable(&self, address: &str) -> Result<VariableValue, ClientError>;
    async fn write_variable(&self, address: &str, value: VariableValue)
        -> Result<(), ClientError>;

    async fn write_command(
        &self,
        axis: &Axis,
        command: UnifiedCommand,
        value: f64,
    ) -> Result<(), ClientError> {
        let address = self.translator().translate(axis, command);
        self.write_variable(&address, VariableValue::Real(value)).await
    }

    async fn read_axis(&self, axis: &Axis) -> Result<AxisSnapshot, ClientError> {
        let t = self.translator();
        let position = read_as(self, t.address(axis, POSITION), VariableValue::as_f64).await?;
        let target = read_as(self, t.address(axis, TARGET_POSITION), VariableValue::as_f64).await?;
        let velocity = read_as(self, t.address(axis, VELOCITY), VariableValue::as_f64).await?;
        let status = read_as(self, t.address(axis, STATUS), VariableValue::as_i64).await?;
        let enabled = read_as(self, t.address(axis, ENABLED), VariableValue::as_bool).await?;
        let error_code = read_as(self, t.address(axis, ERROR_CODE), VariableValue::as_i64).await?;
        let error_message =
            read_as(self, t.address(axis, ERROR_MESSAGE), VariableValue::to_text).await?;

        Ok(AxisSnapshot::new(&axis.id, &axis.display_name)
            .with_motion(position, target, velocity)
            .with_status(AxisStatus::from_code(status), enabled)
            .with_error(error_code, error_message))
    }

    /// Reads every registered axis. Axes are read concurrently; the result
    /// keeps registry order.
    async fn get_all_axis_data(&self) -> Result<Vec<AxisSnapshot>, ClientError> {
        if !self.is_connected() {
            return Err(ClientError::NotConnected {
                client: self.name().to_string(),
            });
        }
        let reads = self.registry().axes().iter().map(|axis| self.read_axis(axis));
        futures::future::try_join_all(reads).await
    }
}

async fn read_as<C, T>(
    client: &C,
    address: String,
    convert: fn(&VariableValue) -> Option<T>,
) -> Result<T, ClientError>
where
    C: ProtocolClient + ?Sized,
{
    let value = client.read_variable(&address).await?;
    convert(&value).ok_or_else(|| ClientError::TypeMismatch {
        address,
        found: value.kind(),
    })
}
