use std::{sync::Arc, time::Duration};

use tracing::{debug, info, warn};

use super::{
    error::ClientError, transport::VariableTransport, ConnectionCell, ConnectionState,
    VariableValue,
};

/// Connection lifecycle and bounded I/O over a transport. Each client owns
/// exactly one session.
pub struct Session {
    name: String,
    transport: Arc<dyn VariableTransport>,
    state: ConnectionCell,
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl Session {
    pub fn new(
        name: impl Into<String>,
        transport: Arc<dyn VariableTransport>,
        connect_timeout: Duration,
        io_timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            transport,
            state: ConnectionCell::new(),
            connect_timeout,
            io_timeout,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    pub fn is_connected(&self) -> bool {
        self.state.get() == ConnectionState::Connected
    }

    /// Marks the session failed without attempting I/O.
    pub fn reject(&self, reason: impl Into<String>) -> ClientError {
        self.state.set(ConnectionState::Failed);
        ClientError::Connection {
            client: self.name.clone(),
            reason: reason.into(),
        }
    }

    pub async fn open(&self, target: &str) -> Result<(), ClientError> {
        if !self.begin_connect()? {
            debug!(client = %self.name, "already connected");
            return Ok(());
        }
        debug!(client = %self.name, target, "connecting");

        match tokio::time::timeout(self.connect_timeout, self.transport.open(target)).await {
            Ok(Ok(())) => {
                if self
                    .state
                    .compare_exchange(ConnectionState::Connecting, ConnectionState::Connected)
                    .is_err()
                {
                    self.transport.close().await;
                    warn!(client = %self.name, target, "disconnected during connect");
                    return Err(ClientError::Connection {
                        client: self.name.clone(),
                        reason: "disconnected during connect".to_string(),
                    });
                }
                info!(client = %self.name, target, "connected");
                Ok(())
            }
            Ok(Err(e)) => {
                self.abandon_connect();
                warn!(client = %self.name, target, error = %e, "connect failed");
                Err(ClientError::Connection {
                    client: self.name.clone(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                self.abandon_connect();
                warn!(client = %self.name, target, timeout = ?self.connect_timeout, "connect timed out");
                Err(ClientError::Timeout {
                    client: self.name.clone(),
                    operation: "connect",
                    timeout: self.connect_timeout,
                })
            }
        }
    }

    /// Claims the `Connecting` state. Returns `Ok(false)` when the session is
    /// already connected.
    fn begin_connect(&self) -> Result<bool, ClientError> {
        let mut current = self.state.get();
        loop {
            match current {
                ConnectionState::Connected => return Ok(false),
                ConnectionState::Connecting => {
                    return Err(ClientError::Connection {
                        client: self.name.clone(),
                        reason: "connect already in progress".to_string(),
                    })
                }
                ConnectionState::Disconnected | ConnectionState::Failed => {
                    match self
                        .state
                        .compare_exchange(current, ConnectionState::Connecting)
                    {
                        Ok(()) => return Ok(true),
                        Err(found) => current = found,
                    }
                }
            }
        }
    }

    // A disconnect issued mid-connect wins; its state is left alone.
    fn abandon_connect(&self) {
        let _ = self
            .state
            .compare_exchange(ConnectionState::Connecting, ConnectionState::Failed);
    }

    pub async fn close(&self) {
        let previous = self.state.swap(ConnectionState::Disconnected);
        if previous == ConnectionState::Connected {
            self.transport.close().await;
            info!(client = %self.name, "disconnected");
        }
    }

    fn ensure_connected(&self) -> Result<(), ClientError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(ClientError::NotConnected {
                client: self.name.clone(),
            })
        }
    }

    pub async fn read(&self, address: &str) -> Result<VariableValue, ClientError> {
        self.ensure_connected()?;
        match tokio::time::timeout(self.io_timeout, self.transport.read(address)).await {
            Ok(result) => result.map_err(|e| ClientError::Transport(format!("{}: {}", self.name, e))),
            Err(_) => Err(self.timed_out("read")),
        }
    }

    pub async fn write(&self, address: &str, value: VariableValue) -> Result<(), ClientError> {
        self.ensure_connected()?;
        match tokio::time::timeout(self.io_timeout, self.transport.write(address, value)).await {
            Ok(result) => result.map_err(|e| ClientError::Transport(format!("{}: {}", self.name, e))),
            Err(_) => Err(self.timed_out("write")),
        }
    }

    fn timed_out(&self, operation: &'static str) -> ClientError {
        ClientError::Timeout {
            client: self.name.clone(),
            operation,
            timeout: self.io_timeout,
        }
    }
}
