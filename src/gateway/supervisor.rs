use std::{sync::Arc, time::Duration};

use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, info, warn};

use super::config::ReconnectConfig;
use crate::{
    command::Channel,
    protocol_client::{ConnectionState, ProtocolClient},
};

#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    pub check_interval: Duration,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: Duration,
}

impl ReconnectPolicy {
    /// Delay before the given (1-indexed) retry: exponential in the attempt
    /// count, capped at `max_delay`, plus up to `jitter`.
    pub fn backoff_delay(&self, attempt: u32, rng: &mut StdRng) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let base = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(exponent))
            .min(self.max_delay);
        if self.jitter.is_zero() {
            base
        } else {
            let jitter_ms = rng.gen_range(0..=self.jitter.as_millis().max(1) as u64);
            base + Duration::from_millis(jitter_ms)
        }
    }
}

impl From<&ReconnectConfig> for ReconnectPolicy {
    fn from(config: &ReconnectConfig) -> Self {
        Self {
            check_interval: Duration::from_millis(config.check_interval_ms),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            jitter: Duration::from_millis(config.jitter_ms),
        }
    }
}

/// Keeps one client connected in the background, retrying with backoff
/// while it is down. Runs until `shutdown` fires or its sender is dropped.
pub fn spawn(
    channel: Channel,
    client: Arc<dyn ProtocolClient>,
    policy: ReconnectPolicy,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut rng = StdRng::from_entropy();
        let mut attempt: u32 = 0;
        let mut delay = policy.check_interval;

        loop {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.recv() => {
                    debug!(client = client.name(), ?channel, "reconnect supervisor stopping");
                    break;
                }
            }

            delay = match client.state() {
                ConnectionState::Connected => {
                    attempt = 0;
                    policy.check_interval
                }
                ConnectionState::Connecting => policy.check_interval,
                ConnectionState::Disconnected | ConnectionState::Failed => {
                    attempt = attempt.saturating_add(1);
                    match client.connect().await {
                        Ok(()) => {
                            info!(client = client.name(), ?channel, attempt, "reconnected");
                            attempt = 0;
                            policy.check_interval
                        }
                        Err(e) => {
                            let backoff = policy.backoff_delay(attempt, &mut rng);
                            warn!(
                                client = client.name(),
                                ?channel,
                                attempt,
                                retry_in = ?backoff,
                                error = %e,
                                "reconnect failed"
                            );
                            backoff
                        }
                    }
                }
            };
        }
    })
}
