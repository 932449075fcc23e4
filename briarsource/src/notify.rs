//! Notification boundary
//!
//! User-facing announcements ("stream is online", storage reports, ...) go
//! through this trait so the orchestrator stays independent of the chat
//! transport actually delivering them.

use crate::model::ChannelId;
use async_trait::async_trait;

/// Delivers a plain-text message to a bound notification channel.
///
/// Implementations must be cheap to clone behind an `Arc` and safe to call
/// concurrently from unrelated tasks. Delivery failures should be reported
/// as errors, not panics; callers log and move on.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `message` to `channel`
    async fn send(&self, channel: ChannelId, message: &str) -> anyhow::Result<()>;
}
