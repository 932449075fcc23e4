//! # briarbridge
//!
//! Bridges an externally hosted Icecast live stream into a guild voice
//! session. Each configured stream gets one long-lived monitor task that
//! polls the server's `status-json.xsl` on a fixed interval and reacts to
//! availability transitions:
//!
//! - **went online** : announce, join the bound voice channel (with stage
//!   speaker promotion when configured), resolve the stream URL and play it
//! - **title changed** : announce only, no rejoin
//! - **went offline** : announce and tear the session down
//!
//! A fetch failure counts as an offline observation, but only triggers the
//! offline transition if the stream was previously seen online; a dead
//! endpoint stays silent instead of spamming notifications.
//!
//! All session mutation goes through the shared
//! [`briarsession::SessionController`], so a bridge-triggered leave can
//! never race a user's manual leave for the same guild.
//!
//! # Example
//!
//! ```no_run
//! use briarbridge::{IcecastClient, StreamBinding, StreamMonitor, DEFAULT_POLL_INTERVAL};
//! use briarsource::{ChannelId, GuildId, TrackResolver};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(
//! #     controller: Arc<briarsession::SessionController>,
//! #     resolver: TrackResolver,
//! #     notifier: Arc<dyn briarsource::Notifier>,
//! # ) {
//! let binding = StreamBinding {
//!     url: "http://radio.example:8000/live".to_string(),
//!     guild: GuildId(1),
//!     voice_channel: ChannelId(10),
//!     notify_channel: ChannelId(20),
//!     stage_channel: false,
//!     poll_interval: DEFAULT_POLL_INTERVAL,
//! };
//! let status = Arc::new(IcecastClient::new(&binding.url));
//! let monitor = StreamMonitor::new(binding, status, controller, resolver, notifier);
//!
//! let shutdown = CancellationToken::new();
//! tokio::spawn(monitor.run(shutdown.clone()));
//! # }
//! ```

mod error;
mod monitor;
mod status;

// Re-exports
pub use error::{Error, Result};
pub use monitor::{
    MonitorState, StreamBinding, StreamMonitor, Transition, DEFAULT_POLL_INTERVAL,
};
pub use status::{IcecastClient, StatusSource, StatusDocument, DEFAULT_STATUS_TIMEOUT_SECS};
