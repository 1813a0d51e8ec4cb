pub mod config;

use anyhow::Result;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::{
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tokio::{
    net::{UnixListener, UnixStream},
    sync::broadcast,
};
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, error, info, warn};

use crate::{
    axis::Axis,
    gateway::AxisGateway,
    protocol::{
        client_command::ClientCommand, parse_command, serialize_response,
        server_response::ServerResponse,
    },
};
use config::SocketServerConfig;

#[derive(Serialize)]
struct AxisList<'a> {
    axes: &'a [Axis],
}

#[derive(Serialize)]
struct Pong {
    message: &'static str,
    timestamp: chrono::DateTime<chrono::Utc>,
}

/// Line-delimited JSON relay in front of an [`AxisGateway`].
pub struct SocketServer {
    config: SocketServerConfig,
    gateway: Arc<AxisGateway>,
    shutdown_tx: Option<broadcast::Sender<()>>,
}

impl SocketServer {
    pub fn new(config: SocketServerConfig, gateway: Arc<AxisGateway>) -> Self {
        Self {
            config,
            gateway,
            shutdown_tx: None,
        }
    }

    /// Binds the socket, replacing a stale socket file, and serves clients
    /// on a background task until [`SocketServer::shutdown`].
    pub async fn start(&mut self) -> Result<()> {
        self.remove_socket_file().await?;
        let listener = UnixListener::bind(&self.config.socket_path)?;
        info!(path = %self.config.socket_path, "relay listening");

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        self.shutdown_tx = Some(shutdown_tx);

        tokio::spawn(Self::accept_loop(
            listener,
            self.gateway.clone(),
            self.config.clone(),
            shutdown_rx,
        ));
        Ok(())
    }

    pub async fn shutdown(&self) -> Result<()> {
        if let Some(shutdown_tx) = &self.shutdown_tx {
            let _ = shutdown_tx.send(());
        }
        self.remove_socket_file().await?;
        info!(path = %self.config.socket_path, "relay stopped");
        Ok(())
    }

    async fn remove_socket_file(&self) -> Result<()> {
        if Path::new(&self.config.socket_path).exists() {
            tokio::fs::remove_file(&self.config.socket_path).await?;
        }
        Ok(())
    }

    async fn accept_loop(
        listener: UnixListener,
        gateway: Arc<AxisGateway>,
        config: SocketServerConfig,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) {
        let active = Arc::new(AtomicUsize::new(0));

        loop {
            let stream = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, _)) => stream,
                    Err(e) => {
                        error!(error = %e, "accept failed");
                        continue;
                    }
                },
                _ = shutdown_rx.recv() => break,
            };

            if active.load(Ordering::Relaxed) >= config.max_connections {
                warn!(limit = config.max_connections, "relay at capacity, dropping client");
                continue;
            }
            let clients = active.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(clients, "relay client attached");

            let gateway = gateway.clone();
            let active = active.clone();
            let shutdown_rx = shutdown_rx.resubscribe();
            let max_line_length = config.buffer_size;
            tokio::spawn(async move {
                if let Err(e) =
                    Self::handle_client(stream, &gateway, max_line_length, shutdown_rx).await
                {
                    warn!(error = %e, "relay client dropped");
                }
                let clients = active.fetch_sub(1, Ordering::Relaxed) - 1;
                debug!(clients, "relay client detached");
            });
        }
    }

    async fn handle_client(
        stream: UnixStream,
        gateway: &AxisGateway,
        max_line_length: usize,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(max_line_length));

        loop {
            let line = tokio::select! {
                next = framed.next() => match next {
                    Some(line) => line?,
                    None => return Ok(()),
                },
                _ = shutdown_rx.recv() => return Ok(()),
            };

            debug!(request = %line, "relay request");
            let response = Self::process_command(&line, gateway).await;
            framed.send(serialize_response(&response)?).await?;
        }
    }

    pub async fn process_command(line: &str, gateway: &AxisGateway) -> ServerResponse {
        let command = match parse_command(line) {
            Ok(cmd) => cmd,
            Err(e) => return ServerResponse::error(None, e.to_string()),
        };

        let id = command.id().cloned();

        match command {
            ClientCommand::SendCommand {
                axis,
                command,
                value,
                ..
            } => match gateway.send_command(&axis, &command, value).await {
                Ok(result) => Self::to_response(id, &result),
                Err(e) => ServerResponse::rejected(id, &e),
            },
            ClientCommand::GetAllAxes { .. } => {
                Self::to_response(id, &gateway.get_all_axes_with_channel().await)
            }
            ClientCommand::GetSystemStatus { .. } => {
                Self::to_response(id, &gateway.system_status())
            }
            ClientCommand::ListAxes { .. } => Self::to_response(
                id,
                &AxisList {
                    axes: gateway.registry().axes(),
                },
            ),
            ClientCommand::Ping { .. } => Self::to_response(
                id,
                &Pong {
                    message: "pong",
                    timestamp: chrono::Utc::now(),
                },
            ),
        }
    }

    fn to_response<T: Serialize>(id: Option<String>, data: &T) -> ServerResponse {
        match serde_json::to_value(data) {
            Ok(value) => ServerResponse::success(id, value),
            Err(e) => ServerResponse::error(id, format!("response encoding failed: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{axis::AxisRegistry, gateway::config::GatewayConfig};
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    fn simulated_gateway() -> Arc<AxisGateway> {
        Arc::new(AxisGateway::new(
            GatewayConfig::default(),
            Arc::new(AxisRegistry::default()),
        ))
    }

    async fn response(line: &str) -> serde_json::Value {
        let gateway = simulated_gateway();
        let response = SocketServer::process_command(line, &gateway).await;
        serde_json::from_str(&serialize_response(&response).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_send_command_relay() {
        let json = response(
            r#"{"type": "send_command", "axis": "axis1", "command": "moveTo", "value": 42, "id": "r1"}"#,
        )
        .await;
        assert_eq!(json["status"], "success");
        assert_eq!(json["id"], "r1");
        assert_eq!(json["data"]["axisID"], "axis1");
        assert_eq!(json["data"]["channel"], "Simulated");
        assert_eq!(json["data"]["succeeded"], true);
    }

    #[tokio::test]
    async fn test_invalid_input_codes() {
        let json = response(r#"{"type": "send_command", "axis": "axis9", "command": "stop"}"#).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], "unknown_axis");

        let json =
            response(r#"{"type": "send_command", "axis": "axis1", "command": "teleport"}"#).await;
        assert_eq!(json["code"], "unknown_command");

        let json = response("not json").await;
        assert_eq!(json["status"], "error");
    }

    #[tokio::test]
    async fn test_queries() {
        let json = response(r#"{"type": "get_all_axes"}"#).await;
        assert_eq!(json["data"]["axes"].as_array().unwrap().len(), 3);

        let json = response(r#"{"type": "get_system_status"}"#).await;
        assert_eq!(json["data"]["primaryConnected"], false);
        assert_eq!(json["data"]["simulated"], true);

        let json = response(r#"{"type": "list_axes"}"#).await;
        assert_eq!(json["data"]["axes"][0]["id"], "axis1");
    }

    #[tokio::test]
    async fn test_serves_over_unix_socket() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("axisgate.sock");
        let config = SocketServerConfig {
            socket_path: socket_path.to_string_lossy().into_owned(),
            ..SocketServerConfig::default()
        };

        let mut server = SocketServer::new(config, simulated_gateway());
        server.start().await.unwrap();

        let stream = UnixStream::connect(&socket_path).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        write_half
            .write_all(b"{\"type\": \"ping\", \"id\": \"p\"}\n")
            .await
            .unwrap();

        let mut lines = BufReader::new(read_half).lines();
        let line = lines.next_line().await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["message"], "pong");

        server.shutdown().await.unwrap();
        assert!(!socket_path.exists());
    }
}
