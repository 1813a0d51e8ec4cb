use std::sync::Arc;

use crate::{
    axis::AxisRegistry,
    command::translator::{AddressScheme, CommandTranslator},
};

use super::{
    config::OpcUaConfig, error::ClientError, session::Session, transport::VariableTransport,
    ConnectionState, ProtocolClient, VariableValue,
};

const ENDPOINT_SCHEME: &str = "opc.tcp://";

/// Secondary fieldbus client. Nodes are addressed as
/// `{namespace}:{axisID}.{Variable}`.
pub struct OpcUaClient {
    config: OpcUaConfig,
    registry: Arc<AxisRegistry>,
    translator: CommandTranslator,
    session: Session,
}

impl OpcUaClient {
    pub fn new(
        config: OpcUaConfig,
        registry: Arc<AxisRegistry>,
        transport: Arc<dyn VariableTransport>,
    ) -> Self {
        let session = Session::new(
            config.name.clone(),
            transport,
            config.connect_timeout(),
            config.io_timeout(),
        );
        let translator = CommandTranslator::new(AddressScheme::Namespaced {
            namespace: config.namespace.clone(),
        });
        Self {
            config,
            registry,
            translator,
            session,
        }
    }

    pub fn with_synthetic_transport(config: OpcUaConfig, registry: Arc<AxisRegistry>) -> Self {
        let transport = Arc::new(config.synthetic.transport());
        Self::new(config, registry, transport)
    }

    fn validate(&self) -> Result<(), String> {
        let Some(host) = self.config.endpoint.strip_prefix(ENDPOINT_SCHEME) else {
            return Err(format!(
                "endpoint must start with {}: {}",
                ENDPOINT_SCHEME, self.config.endpoint
            ));
        };
        if host.is_empty() {
            return Err("endpoint has no host".to_string());
        }
        if self.config.namespace.trim().is_empty() {
            return Err("namespace must not be empty".to_string());
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProtocolClient for OpcUaClient {
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
        if let Err(reason) = self.validate() {
            return Err(self.session.reject(reason));
        }
        self.session.open(&self.config.endpoint).await
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

    fn client(config: OpcUaConfig) -> OpcUaClient {
        OpcUaClient::with_synthetic_transport(config, Arc::new(AxisRegistry::default()))
    }

    #[tokio::test]
    async fn test_connect_and_read() {
        let client = client(OpcUaConfig::default());
        client.connect().await.unwrap();

        let value = client
            .read_variable("ns=2;s=Machine:axis2.Velocity")
            .await
            .unwrap();
        assert!(value.as_f64().is_some());

        let axes = client.get_all_axis_data().await.unwrap();
        assert_eq!(axes.len(), 3);
    }

    #[tokio::test]
    async fn test_bad_endpoint_rejected() {
        let client = client(OpcUaConfig {
            endpoint: "http://localhost:4840".to_string(),
            ..OpcUaConfig::default()
        });
        assert!(client.connect().await.is_err());
        assert_eq!(client.state(), ConnectionState::Failed);
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let mut config = OpcUaConfig::default();
        config.synthetic.reachable = false;
        config.synthetic.connect_latency_ms = 1;
        let client = client(config);

        assert!(client.connect().await.is_err());
        assert!(!client.is_connected());
        let err = client.read_variable("ns=2;s=Machine:axis1.Position").await;
        assert!(matches!(err, Err(ClientError::NotConnected { .. })));
    }
}
