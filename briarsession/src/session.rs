//! Guild session state record

use briarqueue::{PlaybackQueue, SkipVotes};
use briarsource::{ChannelId, GuildId};
use tokio::sync::{Mutex, MutexGuard};

/// Connection lifecycle of a session.
///
/// Transitions: Disconnected → Connecting → Connected → Disconnected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Everything a session owns, guarded by the session mutex.
///
/// The vote set is scoped to the current track and cleared on every track
/// change; queue order is strict insertion order.
#[derive(Debug)]
pub struct SessionInner {
    pub state: ConnectionState,
    pub voice_channel: ChannelId,
    pub notify_channel: Option<ChannelId>,
    pub queue: PlaybackQueue,
    pub votes: SkipVotes,
    pub paused: bool,
}

/// Live playback state bound to one guild.
///
/// At most one instance exists per guild (enforced by the registry). All
/// mutable state sits behind one async mutex: holding the guard across
/// backend calls is what serializes concurrent operations for the guild.
#[derive(Debug)]
pub struct GuildSession {
    guild_id: GuildId,
    inner: Mutex<SessionInner>,
}

impl GuildSession {
    /// Create a session in the Connecting state, bound to a voice channel
    pub(crate) fn new(guild_id: GuildId, voice_channel: ChannelId, quorum_percent: u64) -> Self {
        Self {
            guild_id,
            inner: Mutex::new(SessionInner {
                state: ConnectionState::Connecting,
                voice_channel,
                notify_channel: None,
                queue: PlaybackQueue::new(),
                votes: SkipVotes::new(quorum_percent),
                paused: false,
            }),
        }
    }

    /// Guild this session belongs to
    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    /// Acquire the session mutex.
    ///
    /// All mutation goes through this guard; never mutate session state
    /// from outside the controller.
    pub async fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().await
    }
}
