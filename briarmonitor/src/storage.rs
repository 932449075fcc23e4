//! Storage pool health reporter
//!
//! Polls a TrueNAS-style REST API for ZFS pool state and posts a formatted
//! report to a notification channel. Pools, vdevs and member disks each get
//! a line with a ✅/⚠️ marker depending on their reported state.

use crate::error::{Error, Result};
use briarsource::{ChannelId, Notifier};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Default interval between reports (1 hour)
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(3600);

/// One ZFS pool as reported by the storage API
#[derive(Debug, Deserialize)]
pub struct Pool {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub healthy: bool,
    #[serde(default)]
    pub topology: Option<Topology>,
}

/// Vdev layout of a pool
#[derive(Debug, Default, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub data: Vec<VdevNode>,
}

/// One vdev or member disk
#[derive(Debug, Deserialize)]
pub struct VdevNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub disk: Option<String>,
    #[serde(default)]
    pub children: Vec<VdevNode>,
}

impl VdevNode {
    fn marker(&self) -> &'static str {
        state_marker(self.status.as_deref())
    }

    fn label(&self) -> &str {
        self.disk.as_deref().unwrap_or(&self.kind)
    }
}

fn state_marker(state: Option<&str>) -> &'static str {
    match state {
        Some(s) if s.eq_ignore_ascii_case("ONLINE") => "✅",
        _ => "⚠️",
    }
}

/// Render pools into the channel report.
///
/// Vdev groups are indented one space, member disks two, mirroring the
/// usual `zpool status` layout.
pub fn format_report(pools: &[Pool]) -> String {
    let mut lines = vec!["ZFS Pool Status".to_string()];

    for pool in pools {
        let state = pool.status.as_deref().unwrap_or("UNKNOWN");
        let marker = if pool.healthy || state.eq_ignore_ascii_case("ONLINE") {
            "✅"
        } else {
            "⚠️"
        };
        lines.push(format!("{marker} Pool: {} — {state}", pool.name));

        let Some(topology) = &pool.topology else {
            continue;
        };
        for vdev in &topology.data {
            if vdev.children.is_empty() {
                // Single-disk vdev
                lines.push(format!("  {} {}", vdev.marker(), vdev.label()));
                continue;
            }
            lines.push(format!(" {} {}", vdev.marker(), vdev.kind));
            for child in &vdev.children {
                lines.push(format!("  {} {}", child.marker(), child.label()));
            }
        }
    }

    lines.join("\n")
}

/// Periodic pool health reporter
pub struct StorageHealthReporter {
    client: Client,
    base_url: String,
    api_key: String,
    notify_channel: ChannelId,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
}

impl StorageHealthReporter {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        notify_channel: ChannelId,
        notifier: Arc<dyn Notifier>,
        interval: Duration,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            notify_channel,
            notifier,
            interval,
        }
    }

    /// Fetch the current pool list from the storage API
    pub async fn fetch_pools(&self) -> Result<Vec<Pool>> {
        let response = self
            .client
            .get(format!("{}/api/v2.0/pool", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Api(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }

    /// One fetch-and-report cycle; failures are logged, never propagated
    pub async fn cycle(&self) {
        let pools = match self.fetch_pools().await {
            Ok(pools) => pools,
            Err(e) => {
                warn!(error = %e, "Failed to fetch storage pool status");
                return;
            }
        };
        if pools.is_empty() {
            return;
        }

        let report = format_report(&pools);
        if let Err(e) = self.notifier.send(self.notify_channel, &report).await {
            warn!(error = %e, "Failed to send storage report");
        }
    }

    /// Report until the token is cancelled
    pub async fn run(self, shutdown: CancellationToken) {
        info!(url = %self.base_url, interval = ?self.interval, "Storage reporter started");
        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Storage reporter stopping");
                    break;
                }
                _ = interval.tick() => {
                    self.cycle().await;
                }
            }
        }
    }
}
