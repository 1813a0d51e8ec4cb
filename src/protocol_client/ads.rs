use std::sync::Arc;

use crate::{
    axis::AxisRegistry,
    command::translator::{AddressScheme, CommandTranslator},
};

use super::{
    config::AdsConfig, error::ClientError, session::Session, transport::VariableTransport,
    ConnectionState, ProtocolClient, VariableValue,
};

/// Primary fieldbus client. Variables are addressed by symbol name under each
/// axis' address prefix (`GVL.Axis1.Position`).
pub struct AdsClient {
    config: AdsConfig,
    registry: Arc<AxisRegistry>,
    translator: CommandTranslator,
    session: Session,
}

impl AdsClient {
    pub fn new(
        config: AdsConfig,
        registry: Arc<AxisRegistry>,
        transport: Arc<dyn VariableTransport>,
    ) -> Self {
        let session = Session::new(
            config.name.clone(),
            transport,
            config.connect_timeout(),
            config.io_timeout(),
        );
        Self {
            config,
            registry,
            translator: CommandTranslator::new(AddressScheme::Prefixed),
            session,
        }
    }

    pub fn with_synthetic_transport(config: AdsConfig, registry: Arc<AxisRegistry>) -> Self {
        let transport = Arc::new(config.synthetic.transport());
        Self::new(config, registry, transport)
    }

    /// Route target in `netid:port` form.
    pub fn target(&self) -> String {
        format!("{}:{}", self.config.ams_net_id, self.config.port)
    }
}

/// An AMS net id is six dot-separated octets, e.g. `5.80.201.232.1.1`.
pub fn is_valid_ams_net_id(net_id: &str) -> bool {
    let parts: Vec<&str> = net_id.split('.').collect();
    parts.len() == 6 && parts.iter().all(|p| p.parse::<u8>().is_ok())
}

#[async_trait::async_trait]
impl ProtocolClient for AdsClient {
    fn name(&self) -> &str {
        self.session.name()
    }

    fn state(&self) -> ConnectionState {
        self.session.state()
    }

    fn registry(&self) -> &AxisRegistry {
        &self.registry
    }

    fn translator(&self) -> &CommandTranslator {
        &self.translator
    }

    async fn connect(&self) -> Result<(), ClientError> {
        if !is_valid_ams_net_id(&self.config.ams_net_id) {
            return Err(self
                .session
                .reject(format!("invalid AMS net id: {}", self.config.ams_net_id)));
        }
        if self.config.port == 0 {
            return Err(self.session.reject("AMS port must be non-zero"));
        }
        self.session.open(&self.target()).await
    }

    async fn disconnect(&self) {
        self.session.close().await
    }

    async fn read_variable(&self, address: &str) -> Result<VariableValue, ClientError> {
        self.session.read(address).await
    }

    async fn write_variable(
        &self,
        address: &str,
        value: VariableValue,
    ) -> Result<(), ClientError> {
        self.session.write(address, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{axis::state::AxisStatus, command::UnifiedCommand};

    fn client(config: AdsConfig) -> AdsClient {
        AdsClient::with_synthetic_transport(config, Arc::new(AxisRegistry::default()))
    }

    #[test]
    fn test_ams_net_id_validation() {
        assert!(is_valid_ams_net_id("5.80.201.232.1.1"));
        assert!(!is_valid_ams_net_id("5.80.201.232.1"));
        assert!(!is_valid_ams_net_id("5.80.201.232.1.256"));
        assert!(!is_valid_ams_net_id("localhost"));
    }

    #[tokio::test]
    async fn test_connect_and_snapshot() {
        let client = client(AdsConfig::default());
        assert!(!client.is_connected());
        client.connect().await.unwrap();
        assert!(client.is_connected());

        let axes = client.get_all_axis_data().await.unwrap();
        let ids: Vec<&str> = axes.iter().map(|a| a.axis_id.as_str()).collect();
        assert_eq!(ids, vec!["axis1", "axis2", "axis3"]);
        for axis in &axes {
            assert!(AxisStatus::ALL.contains(&axis.status));
            assert!((0.0..100.0).contains(&axis.position));
            assert_eq!(axis.error_code, 0);
        }

        let axis = client.registry().get("axis1").unwrap().clone();
        client
            .write_command(&axis, UnifiedCommand::MoveTo, 42.0)
            .await
            .unwrap();

        client.disconnect().await;
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_invalid_net_id_fails_without_io() {
        let config = AdsConfig {
            ams_net_id: "not-a-net-id".to_string(),
            ..AdsConfig::default()
        };
        let client = client(config);
        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, ClientError::Connection { .. }));
        assert_eq!(client.state(), ConnectionState::Failed);
    }

    #[tokio::test]
    async fn test_snapshot_requires_connection() {
        let client = client(AdsConfig::default());
        let err = client.get_all_axis_data().await.unwrap_err();
        assert!(matches!(err, ClientError::NotConnected { .. }));
    }
}
