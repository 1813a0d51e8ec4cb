pub mod config;
pub mod error;
pub mod status;
pub mod supervisor;

use std::{future::Future, sync::Arc};

use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    axis::{snapshot::AxisSnapshot, Axis, AxisRegistry},
    command::{Channel, CommandRequest, CommandResult},
    config::Config,
    protocol_client::{ads::AdsClient, error::ClientError, opcua::OpcUaClient, ProtocolClient},
    simulation::SimulatedFallback,
};
use config::GatewayConfig;
use error::GatewayError;
use status::{AxisReadout, SystemStatus};
use supervisor::ReconnectPolicy;

struct ChannelClient {
    channel: Channel,
    client: Arc<dyn ProtocolClient>,
}

/// Protocol-agnostic axis API over an ordered failover chain:
/// primary client, secondary client, then the simulation.
pub struct AxisGateway {
    config: GatewayConfig,
    registry: Arc<AxisRegistry>,
    clients: Vec<ChannelClient>,
    fallback: SimulatedFallback,
    shutdown_tx: broadcast::Sender<()>,
    supervisors: Mutex<Vec<JoinHandle<()>>>,
}

impl AxisGateway {
    pub fn new(config: GatewayConfig, registry: Arc<AxisRegistry>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            fallback: SimulatedFallback::new(registry.clone()),
            registry,
            clients: Vec::new(),
            shutdown_tx,
            supervisors: Mutex::new(Vec::new()),
        }
    }

    pub fn with_primary(self, client: Arc<dyn ProtocolClient>) -> Self {
        self.with_client(Channel::PrimaryProtocol, client)
    }

    pub fn with_secondary(self, client: Arc<dyn ProtocolClient>) -> Self {
        self.with_client(Channel::SecondaryProtocol, client)
    }

    fn with_client(mut self, channel: Channel, client: Arc<dyn ProtocolClient>) -> Self {
        self.clients.retain(|c| c.channel != channel);
        self.clients.push(ChannelClient { channel, client });
        self.clients.sort_by_key(|c| c.channel);
        self
    }

    /// Builds the registry and the enabled fieldbus clients described by
    /// `config`. Clients are not connected until [`AxisGateway::start`].
    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        let registry = Arc::new(
            AxisRegistry::new(config.axes.clone())
                .map_err(|e| GatewayError::Config(e.to_string()))?,
        );

        let mut gateway = Self::new(config.gateway.clone(), registry.clone());
        if config.primary.enabled {
            let client =
                AdsClient::with_synthetic_transport(config.primary.clone(), registry.clone());
            gateway = gateway.with_primary(Arc::new(client));
        }
        if config.secondary.enabled {
            let client = OpcUaClient::with_synthetic_transport(config.secondary.clone(), registry);
            gateway = gateway.with_secondary(Arc::new(client));
        }
        Ok(gateway)
    }

    pub fn registry(&self) -> &AxisRegistry {
        &self.registry
    }

    /// Connects every client once, in chain order. Failures are logged and
    /// skipped; the gateway stays usable through the simulation.
    pub async fn start(&self) -> SystemStatus {
        for entry in &self.clients {
            match entry.client.connect().await {
                Ok(()) => info!(
                    client = entry.client.name(),
                    channel = ?entry.channel,
                    "client connected"
                ),
                Err(e) => warn!(
                    client = entry.client.name(),
                    channel = ?entry.channel,
                    error = %e,
                    "client unavailable at startup"
                ),
            }
        }

        if self.config.reconnect.enabled {
            let policy = ReconnectPolicy::from(&self.config.reconnect);
            let mut supervisors = self.supervisors.lock().await;
            if supervisors.is_empty() {
                for entry in &self.clients {
                    supervisors.push(supervisor::spawn(
                        entry.channel,
                        entry.client.clone(),
                        policy,
                        self.shutdown_tx.subscribe(),
                    ));
                }
                debug!(count = supervisors.len(), "reconnect supervisors started");
            } else {
                debug!(count = supervisors.len(), "reconnect supervisors already running");
            }
        }

        let status = self.system_status();
        if status.simulated {
            warn!("no fieldbus connected, serving simulated axis data");
        }
        status
    }

    /// Stops reconnect supervision and disconnects every client.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
        let handles = std::mem::take(&mut *self.supervisors.lock().await);
        for handle in handles {
            let _ = handle.await;
        }
        for entry in &self.clients {
            entry.client.disconnect().await;
        }
        info!("gateway shut down");
    }

    pub async fn get_all_axes(&self) -> Vec<AxisSnapshot> {
        self.get_all_axes_with_channel().await.axes
    }

    pub async fn get_all_axes_with_channel(&self) -> AxisReadout {
        for entry in &self.clients {
            if !entry.client.is_connected() {
                continue;
            }
            match self.attempt(entry.client.get_all_axis_data()).await {
                Ok(axes) if axes.len() == self.registry.len() => {
                    return AxisReadout {
                        channel: entry.channel,
                        axes,
                    };
                }
                Ok(axes) => warn!(
                    client = entry.client.name(),
                    expected = self.registry.len(),
                    returned = axes.len(),
                    "axis read returned wrong axis count"
                ),
                Err(e) => warn!(client = entry.client.name(), error = %e, "axis read failed"),
            }
        }

        AxisReadout {
            channel: Channel::Simulated,
            axes: self.fallback.snapshots(),
        }
    }

    /// Validates the axis and command name, then runs the command down the
    /// failover chain. Only invalid input produces an error.
    #[instrument(skip(self))]
    pub async fn send_command(
        &self,
        axis_id: &str,
        command: &str,
        value: Option<f64>,
    ) -> Result<CommandResult, GatewayError> {
        let axis = self.resolve(axis_id)?;
        let request = CommandRequest::parse(axis_id, command, value)?;
        Ok(self.dispatch(axis, request).await)
    }

    pub async fn execute(&self, request: CommandRequest) -> Result<CommandResult, GatewayError> {
        let axis = self.resolve(&request.axis_id)?;
        Ok(self.dispatch(axis, request).await)
    }

    pub fn system_status(&self) -> SystemStatus {
        let connected = |channel: Channel| {
            self.clients
                .iter()
                .any(|c| c.channel == channel && c.client.is_connected())
        };
        SystemStatus::new(
            connected(Channel::PrimaryProtocol),
            connected(Channel::SecondaryProtocol),
        )
    }

    fn resolve(&self, axis_id: &str) -> Result<&Axis, GatewayError> {
        self.registry
            .get(axis_id)
            .ok_or_else(|| GatewayError::UnknownAxis(axis_id.to_string()))
    }

    async fn dispatch(&self, axis: &Axis, request: CommandRequest) -> CommandResult {
        let value = request.write_value();
        for entry in &self.clients {
            if !entry.client.is_connected() {
                continue;
            }
            match self
                .attempt(entry.client.write_command(axis, request.command, value))
                .await
            {
                Ok(()) => {
                    info!(
                        axis = %axis.id,
                        command = %request.command,
                        value,
                        channel = ?entry.channel,
                        "command written"
                    );
                    return CommandResult::served(request, entry.channel);
                }
                Err(e) => warn!(
                    axis = %axis.id,
                    command = %request.command,
                    client = entry.client.name(),
                    error = %e,
                    "command write failed"
                ),
            }
        }

        warn!(
            axis = %axis.id,
            command = %request.command,
            "no fieldbus channel served command, acknowledging from simulation"
        );
        self.fallback.acknowledge(request)
    }

    async fn attempt<T>(
        &self,
        operation: impl Future<Output = Result<T, ClientError>>,
    ) -> Result<T, ClientError> {
        let timeout = self.config.attempt_timeout();
        tokio::time::timeout(timeout, operation)
            .await
            .unwrap_or_else(|_| {
                Err(ClientError::Timeout {
                    client: "gateway".to_string(),
                    operation: "attempt",
                    timeout,
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        command::UnifiedCommand,
        protocol_client::config::{AdsConfig, OpcUaConfig},
    };

    fn config(primary_reachable: bool, secondary_reachable: bool) -> Config {
        let mut config = Config::default();
        config.primary.synthetic.reachable = primary_reachable;
        config.primary.synthetic.connect_latency_ms = 1;
        config.secondary.synthetic.reachable = secondary_reachable;
        config.secondary.synthetic.connect_latency_ms = 1;
        config
    }

    #[tokio::test]
    async fn test_start_reports_connected_channels() {
        let gateway = AxisGateway::from_config(&config(true, false)).unwrap();
        let status = gateway.start().await;
        assert!(status.primary_connected);
        assert!(!status.secondary_connected);
        assert!(!status.simulated);
    }

    #[tokio::test]
    async fn test_channel_selection() {
        let cases = [
            (true, true, Channel::PrimaryProtocol),
            (true, false, Channel::PrimaryProtocol),
            (false, true, Channel::SecondaryProtocol),
            (false, false, Channel::Simulated),
        ];
        for (primary, secondary, expected) in cases {
            let gateway = AxisGateway::from_config(&config(primary, secondary)).unwrap();
            gateway.start().await;

            let result = gateway.send_command("axis1", "home", None).await.unwrap();
            assert!(result.succeeded);
            assert_eq!(result.channel, expected);
            assert_eq!(result.degraded, expected == Channel::Simulated);

            let readout = gateway.get_all_axes_with_channel().await;
            assert_eq!(readout.channel, expected);
            assert_eq!(readout.axes.len(), 3);
        }
    }

    #[tokio::test]
    async fn test_input_validation() {
        let gateway = AxisGateway::from_config(&config(true, true)).unwrap();
        gateway.start().await;

        let err = gateway.send_command("axis9", "stop", None).await.unwrap_err();
        assert!(matches!(err, GatewayError::UnknownAxis(ref a) if a == "axis9"));

        let err = gateway.send_command("axis1", "teleport", None).await.unwrap_err();
        assert!(matches!(err, GatewayError::UnknownCommand(ref c) if c == "teleport"));
    }

    #[tokio::test]
    async fn test_without_clients_everything_is_simulated() {
        let gateway = AxisGateway::new(GatewayConfig::default(), Arc::new(AxisRegistry::default()));
        let status = gateway.start().await;
        assert!(status.simulated);

        let request = CommandRequest::new("axis3", UnifiedCommand::Jog, Some(-5.0));
        let result = gateway.execute(request).await.unwrap();
        assert_eq!(result.channel, Channel::Simulated);
        assert_eq!(result.value, Some(-5.0));
    }

    #[tokio::test]
    async fn test_disabled_clients_are_not_built() {
        let mut config = Config::default();
        config.primary = AdsConfig {
            enabled: false,
            ..AdsConfig::default()
        };
        config.secondary = OpcUaConfig {
            enabled: false,
            ..OpcUaConfig::default()
        };
        let gateway = AxisGateway::from_config(&config).unwrap();
        assert!(gateway.start().await.simulated);
    }

    #[tokio::test]
    async fn test_repeated_start_keeps_one_supervisor_per_client() {
        let mut config = config(false, true);
        config.gateway.reconnect.enabled = true;
        let gateway = AxisGateway::from_config(&config).unwrap();

        gateway.start().await;
        let status = gateway.start().await;
        assert!(status.secondary_connected);
        assert_eq!(gateway.supervisors.lock().await.len(), 2);

        gateway.shutdown().await;
        assert!(gateway.supervisors.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_disconnects() {
        let gateway = AxisGateway::from_config(&config(true, true)).unwrap();
        gateway.start().await;
        gateway.shutdown().await;
        let status = gateway.system_status();
        assert!(!status.primary_connected);
        assert!(!status.secondary_connected);
    }
}
