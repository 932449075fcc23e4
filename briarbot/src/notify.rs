//! Notification delivery
//!
//! Production notifications go out through a chat webhook; when no webhook
//! is configured everything lands in the log instead, which keeps the
//! monitors fully functional in a headless setup.

use async_trait::async_trait;
use briarsource::{ChannelId, Notifier};
use reqwest::Client;
use serde_json::json;
use tracing::info;

/// Delivers notifications by POSTing to a chat webhook
pub struct WebhookNotifier {
    client: Client,
    webhook_url: String,
}

impl WebhookNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            webhook_url: webhook_url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, channel: ChannelId, message: &str) -> anyhow::Result<()> {
        self.client
            .post(&self.webhook_url)
            .json(&json!({
                "content": message,
                "channel_id": channel.0,
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Fallback notifier writing announcements to the log
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, channel: ChannelId, message: &str) -> anyhow::Result<()> {
        info!(channel = %channel, "{message}");
        Ok(())
    }
}
