use std::time::Duration;

use tracing::trace;

use super::VariableValue;
use crate::simulation;

/// Wire-level access to a fieldbus. A real ADS or OPC-UA stack plugs in
/// here; clients handle connection state, addressing and timeouts on top.
#[async_trait::async_trait]
pub trait VariableTransport: Send + Sync {
    async fn open(&self, target: &str) -> anyhow::Result<()>;
    async fn close(&self);

    async fn read(&self, address: &str) -> anyhow::Result<VariableValue>;
    async fn write(&self, address: &str, value: VariableValue) -> anyhow::Result<()>;
}

/// Stand-in transport used when no fieldbus stack is linked. Values are
/// synthesized per read; writes are accepted and dropped.
#[derive(Debug, Clone)]
pub struct SyntheticTransport {
    reachable: bool,
    connect_latency: Duration,
    io_latency: Duration,
}

impl SyntheticTransport {
    pub fn new(reachable: bool, connect_latency: Duration, io_latency: Duration) -> Self {
        Self {
            reachable,
            connect_latency,
            io_latency,
        }
    }

    pub fn reachable() -> Self {
        Self::new(true, Duration::from_millis(10), Duration::ZERO)
    }

    pub fn unreachable() -> Self {
        Self::new(false, Duration::from_millis(10), Duration::ZERO)
    }

    async fn io_delay(&self) {
        if !self.io_latency.is_zero() {
            tokio::time::sleep(self.io_latency).await;
        }
    }
}

#[async_trait::async_trait]
impl VariableTransport for SyntheticTransport {
    async fn open(&self, target: &str) -> anyhow::Result<()> {
        tokio::time::sleep(self.connect_latency).await;
        if !self.reachable {
            return Err(anyhow::anyhow!("{} is unreachable", target));
        }
        Ok(())
    }

    async fn close(&self) {}

    async fn read(&self, address: &str) -> anyhow::Result<VariableValue> {
        self.io_delay().await;
        let variable = address.rsplit('.').next().unwrap_or(address);
        simulation::synthetic_value(variable)
            .ok_or_else(|| anyhow::anyhow!("No such variable: {}", address))
    }

    async fn write(&self, address: &str, value: VariableValue) -> anyhow::Result<()> {
        self.io_delay().await;
        trace!(address, ?value, "synthetic write");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_open_fails() {
        let transport = SyntheticTransport::unreachable();
        assert!(transport.open("5.1.2.3.1.1:851").await.is_err());
        assert!(SyntheticTransport::reachable().open("x").await.is_ok());
    }

    #[tokio::test]
    async fn test_read_by_variable_suffix() {
        let transport = SyntheticTransport::reachable();
        let position = transport.read("GVL.Axis1.Position").await.unwrap();
        let position = position.as_f64().unwrap();
        assert!((0.0..100.0).contains(&position));

        let message = transport.read("ns=2;s=Machine:axis1.ErrorMessage").await.unwrap();
        assert_eq!(message.as_text(), Some(""));

        assert!(transport.read("GVL.Axis1.Torque").await.is_err());
    }
}
