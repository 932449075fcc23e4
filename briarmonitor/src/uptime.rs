//! Uptime heartbeat
//!
//! Pushes a GET to an external uptime service (Uptime Kuma style push
//! URL) on a fixed interval. A failed push is logged and retried on the
//! next tick; the loop never exits on its own.

use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default interval between pushes (60 seconds)
pub const DEFAULT_PUSH_INTERVAL: Duration = Duration::from_secs(60);

/// Periodic heartbeat against a push URL
pub struct UptimePinger {
    client: Client,
    push_url: String,
    interval: Duration,
}

impl UptimePinger {
    /// Create a pinger for the given push URL
    pub fn new(push_url: impl Into<String>, interval: Duration) -> Self {
        Self {
            client: Client::new(),
            push_url: push_url.into(),
            interval,
        }
    }

    /// One heartbeat push
    pub async fn ping(&self) {
        match self.client.get(&self.push_url).send().await {
            Ok(response) => {
                debug!(status = %response.status(), "Uptime push sent");
            }
            Err(e) => {
                warn!(error = %e, "Failed to reach the uptime URL");
            }
        }
    }

    /// Push until the token is cancelled
    pub async fn run(self, shutdown: CancellationToken) {
        info!(url = %self.push_url, interval = ?self.interval, "Uptime pinger started");
        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Uptime pinger stopping");
                    break;
                }
                _ = interval.tick() => {
                    self.ping().await;
                }
            }
        }
    }
}
