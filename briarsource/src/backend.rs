//! The audio backend boundary trait
//!
//! Everything the orchestrator needs from the external audio node goes
//! through [`AudioBackend`]: joining and leaving voice channels, loading
//! tracks from a query, and driving playback. The trait is object safe so
//! sessions can hold an `Arc<dyn AudioBackend>`.
//!
//! The orchestrator does not decode or transmit audio itself and does not
//! open its own transport to the node; the backend implementation owns all
//! of that.

use crate::error::Result;
use crate::model::{ChannelId, GuildId, Track};
use async_trait::async_trait;

/// A classified load request, produced from a raw user query.
///
/// See [`crate::resolver::classify`] for the classification rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    /// A well-formed absolute URL, loaded directly
    DirectUrl(String),
    /// An explicit-source search (`sc:terms` style), prefix stripped
    SourceSearch {
        /// Two-letter source tag, lowercased
        source: String,
        /// Search terms with the prefix removed
        terms: String,
    },
    /// A default-source search using the full query as terms
    DefaultSearch(String),
}

/// Outcome of a load request against the backend
#[derive(Debug, Clone)]
pub enum LoadResult {
    /// The backend found nothing
    Empty,
    /// The backend reported a load error
    Error(String),
    /// Ordered candidates, best match first
    Loaded(Vec<Track>),
}

impl LoadResult {
    /// Take the first candidate, if any.
    ///
    /// Remaining candidates are discarded: there is no fallback to later
    /// candidates when the first one fails to play. Known limitation.
    pub fn into_first(self) -> Option<Track> {
        match self {
            LoadResult::Loaded(mut tracks) if !tracks.is_empty() => Some(tracks.remove(0)),
            _ => None,
        }
    }
}

/// Commands accepted by the external audio node.
///
/// All methods are asynchronous and must not block the scheduler; a slow
/// call for one guild must never stall another guild's session.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Join a voice channel on behalf of a guild session
    async fn join_channel(&self, guild: GuildId, channel: ChannelId) -> Result<()>;

    /// Leave a voice channel
    async fn leave_channel(&self, guild: GuildId, channel: ChannelId) -> Result<()>;

    /// Load candidates for a classified request
    async fn load(&self, request: &LoadRequest) -> Result<LoadResult>;

    /// Start (or replace) playback of a track
    async fn play(&self, guild: GuildId, track: &Track) -> Result<()>;

    /// Stop playback of the given track
    async fn stop(&self, guild: GuildId, track: &Track) -> Result<()>;

    /// Pause playback of the given track
    async fn pause(&self, guild: GuildId, track: &Track) -> Result<()>;

    /// Resume a paused track
    async fn resume(&self, guild: GuildId, track: &Track) -> Result<()>;

    /// Whether the node reports an established voice connection
    async fn is_connected(&self, guild: GuildId) -> bool;

    /// Promote the bot to speaker in a moderated stage channel.
    ///
    /// Requires elevated channel permissions; callers should degrade to
    /// [`AudioBackend::request_to_speak`] when this fails.
    async fn become_speaker(&self, guild: GuildId, channel: ChannelId) -> Result<()>;

    /// Raise a hand in a stage channel instead of self-promoting
    async fn request_to_speak(&self, guild: GuildId, channel: ChannelId) -> Result<()>;
}
