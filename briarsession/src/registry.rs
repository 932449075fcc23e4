//! Guild → session registry

use crate::error::{Error, Result};
use crate::session::GuildSession;
use briarsource::{ChannelId, GuildId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Maps guild identity to its single live session.
///
/// `create` checks and inserts under one write lock, so two concurrent
/// creates for the same guild resolve to exactly one surviving session;
/// the loser gets [`Error::AlreadyExists`] before it has established any
/// voice connection worth tearing down.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<GuildId, Arc<GuildSession>>>,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Session for a guild, if one is registered
    pub async fn get(&self, guild: GuildId) -> Option<Arc<GuildSession>> {
        self.sessions.read().await.get(&guild).cloned()
    }

    /// Register a new session for a guild.
    ///
    /// Fails with [`Error::AlreadyExists`] when a session is already
    /// registered; callers treat that as "already joined", not a crash.
    pub async fn create(
        &self,
        guild: GuildId,
        voice_channel: ChannelId,
        quorum_percent: u64,
    ) -> Result<Arc<GuildSession>> {
        let mut sessions = self.sessions.write().await;

        if sessions.contains_key(&guild) {
            return Err(Error::AlreadyExists(guild));
        }

        let session = Arc::new(GuildSession::new(guild, voice_channel, quorum_percent));
        sessions.insert(guild, session.clone());
        Ok(session)
    }

    /// Remove and return a guild's session, if any
    pub async fn remove(&self, guild: GuildId) -> Option<Arc<GuildSession>> {
        self.sessions.write().await.remove(&guild)
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no session is registered
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Guilds with a live session
    pub async fn guilds(&self) -> Vec<GuildId> {
        self.sessions.read().await.keys().copied().collect()
    }
}
