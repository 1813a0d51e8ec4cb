use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::{
    axis::{snapshot::AxisSnapshot, state::AxisStatus, AxisRegistry},
    command::{translator, Channel, CommandRequest, CommandResult},
    protocol_client::VariableValue,
};

pub const POSITION_RANGE: std::ops::Range<f64> = 0.0..100.0;
pub const VELOCITY_RANGE: std::ops::Range<f64> = 0.0..10.0;

/// Produces a plausible value for an axis variable, or `None` if the name is
/// not an axis variable.
pub fn synthetic_value(variable: &str) -> Option<VariableValue> {
    let mut rng = rand::thread_rng();
    let value = match variable {
        translator::POSITION | translator::TARGET_POSITION => {
            VariableValue::Real(rng.gen_range(POSITION_RANGE))
        }
        translator::VELOCITY => VariableValue::Real(rng.gen_range(VELOCITY_RANGE)),
        translator::STATUS => VariableValue::Int(rng.gen_range(0..AxisStatus::ALL.len() as i64)),
        translator::ENABLED => VariableValue::Bool(rng.gen()),
        translator::ERROR_CODE => VariableValue::Int(0),
        translator::ERROR_MESSAGE => VariableValue::Text(String::new()),
        "Enable" | "Disable" | "Home" | "Stop" | "Jog" => VariableValue::Bool(false),
        _ => return None,
    };
    Some(value)
}

/// Software-only axis model served when no fieldbus client is connected.
/// Never fails.
#[derive(Debug, Clone)]
pub struct SimulatedFallback {
    registry: Arc<AxisRegistry>,
}

impl SimulatedFallback {
    pub fn new(registry: Arc<AxisRegistry>) -> Self {
        Self { registry }
    }

    pub fn snapshots(&self) -> Vec<AxisSnapshot> {
        let mut rng = rand::thread_rng();
        self.registry
            .axes()
            .iter()
            .map(|axis| {
                let status = AxisStatus::ALL[rng.gen_range(0..AxisStatus::ALL.len())];
                AxisSnapshot::new(&axis.id, &axis.display_name)
                    .with_motion(
                        rng.gen_range(POSITION_RANGE),
                        rng.gen_range(POSITION_RANGE),
                        rng.gen_range(VELOCITY_RANGE),
                    )
                    .with_status(status, rng.gen())
            })
            .collect()
    }

    pub fn acknowledge(&self, request: CommandRequest) -> CommandResult {
        debug!(
            axis = %request.axis_id,
            command = %request.command,
            value = request.write_value(),
            "command acknowledged by simulation"
        );
        CommandResult::served(request, Channel::Simulated)
    }
}
