//! Session lifecycle controller
//!
//! Top-level entry points for player control. Command-surface operations
//! validate preconditions, delegate to the registry/queue/votes, and return
//! a [`CommandOutcome`] with a human-readable message; errors never escape
//! as panics and never take the process down.
//!
//! The bridge-facing entry points (`ensure_joined`, `play_now`,
//! `disconnect`) carry their own target channel, skip the "user must be in
//! voice" check, and return typed results so the caller can log instead of
//! replying to a user.

use crate::error::{Error, Result};
use crate::registry::SessionRegistry;
use crate::session::{ConnectionState, GuildSession};
use briarqueue::Tally;
use briarsource::{AudioBackend, ChannelId, GuildId, Track, TrackResolver, UserId};
use std::sync::Arc;
use tracing::{debug, warn};

/// User-facing result of a command-surface operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub success: bool,
    pub message: String,
}

impl CommandOutcome {
    /// Successful outcome
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Failed outcome
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// The single mutation gate for per-guild playback state.
///
/// Holds the registry, the backend handle and the resolver; all collaborators
/// are injected at construction time. Cheap to share behind an `Arc`.
pub struct SessionController {
    registry: SessionRegistry,
    backend: Arc<dyn AudioBackend>,
    resolver: TrackResolver,
    quorum_percent: u64,
}

impl SessionController {
    /// Create a controller delegating to the given backend
    pub fn new(backend: Arc<dyn AudioBackend>, quorum_percent: u64) -> Self {
        Self {
            registry: SessionRegistry::new(),
            resolver: TrackResolver::new(backend.clone()),
            backend,
            quorum_percent,
        }
    }

    /// The underlying session registry
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    // ========================================================================
    // Command-surface operations
    // ========================================================================

    /// Join the requesting user's voice channel.
    ///
    /// `user_voice_channel` is `None` when the user is not in voice, which
    /// fails the command without touching any session state.
    pub async fn join(
        &self,
        guild: GuildId,
        user_voice_channel: Option<ChannelId>,
        notify_channel: ChannelId,
    ) -> CommandOutcome {
        let Some(channel) = user_voice_channel else {
            return CommandOutcome::fail("You must be connected to a voice channel!");
        };

        match self.connect(guild, channel, Some(notify_channel)).await {
            Ok(_) => CommandOutcome::ok(format!("Joined {}!", channel.mention())),
            Err(Error::AlreadyExists(_)) => {
                CommandOutcome::fail("I'm already connected to a voice channel here!")
            }
            Err(e) => CommandOutcome::fail(format!("❌ {e}")),
        }
    }

    /// Resolve a query and play it now (empty current slot) or enqueue it.
    ///
    /// Joins implicitly when no session exists, which requires the user to
    /// be in a voice channel.
    pub async fn play(
        &self,
        guild: GuildId,
        query: &str,
        user_voice_channel: Option<ChannelId>,
        notify_channel: ChannelId,
    ) -> CommandOutcome {
        if query.trim().is_empty() {
            return CommandOutcome::fail("Please provide search terms.");
        }

        let session = match self.registry.get(guild).await {
            Some(session) => session,
            None => {
                // Implicit join on the command path only
                let Some(channel) = user_voice_channel else {
                    return CommandOutcome::fail("You must be connected to a voice channel!");
                };
                match self.connect(guild, channel, Some(notify_channel)).await {
                    Ok(session) => session,
                    Err(Error::AlreadyExists(_)) => match self.registry.get(guild).await {
                        Some(session) => session,
                        None => return CommandOutcome::fail("❌ Session vanished while joining."),
                    },
                    Err(e) => return CommandOutcome::fail(format!("❌ {e}")),
                }
            }
        };

        let track = match self.resolver.resolve(query).await {
            Ok(track) => track,
            Err(e) => {
                debug!(guild = %guild, query, error = %e, "Track resolution failed");
                return CommandOutcome::fail(format!(
                    "I wasn't able to find anything for `{query}`."
                ));
            }
        };

        let mut inner = session.lock().await;
        if inner.queue.current().is_none() {
            if let Err(e) = self.backend.play(guild, &track).await {
                return CommandOutcome::fail(format!("❌ {e}"));
            }
            let title = track.title.clone();
            inner.queue.begin(track);
            inner.paused = false;
            CommandOutcome::ok(format!("Now playing: {title}"))
        } else {
            let title = track.title.clone();
            inner.queue.enqueue(track);
            CommandOutcome::ok(format!("Added {title} to queue."))
        }
    }

    /// Stop the current track.
    ///
    /// The queue is deliberately left intact and does not restart on its
    /// own; a new `play` is required.
    pub async fn stop(&self, guild: GuildId) -> CommandOutcome {
        let Some(session) = self.registry.get(guild).await else {
            return CommandOutcome::fail("Woah, can't stop won't stop.");
        };

        let mut inner = session.lock().await;
        if inner.state != ConnectionState::Connected {
            return CommandOutcome::fail("Woah, can't stop won't stop.");
        }
        let Some(track) = inner.queue.current().cloned() else {
            return CommandOutcome::fail("Woah, can't stop won't stop.");
        };

        if let Err(e) = self.backend.stop(guild, &track).await {
            return CommandOutcome::fail(format!("❌ {e}"));
        }

        inner.queue.take_current();
        inner.votes.clear();
        inner.paused = false;
        CommandOutcome::ok("No longer playing anything.")
    }

    /// Cast a skip vote; applies the skip once the quorum passes.
    ///
    /// `present` lists the non-automated users currently in the session's
    /// voice channel; it is both the tally denominator and the set the
    /// recorded voters are pruned against. A caster outside `present` is
    /// rejected outright, keeping the vote set a subset of the occupants.
    pub async fn skip(
        &self,
        guild: GuildId,
        user: UserId,
        present: &[UserId],
    ) -> CommandOutcome {
        let Some(session) = self.registry.get(guild).await else {
            return CommandOutcome::fail("Nothing to skip right now.");
        };

        let mut inner = session.lock().await;
        if inner.state != ConnectionState::Connected || inner.queue.current().is_none() {
            return CommandOutcome::fail("Nothing to skip right now.");
        }

        if !present.contains(&user) {
            return CommandOutcome::fail("You must be in the voice channel to vote!");
        }

        inner.votes.retain_present(present);
        let votes = match inner.votes.cast(user) {
            Ok(votes) => votes,
            Err(briarqueue::Error::AlreadyVoted(_)) => {
                return CommandOutcome::fail("You've already voted to skip this track!");
            }
        };

        match inner.votes.tally(present.len()) {
            Tally::Pending => CommandOutcome::ok(format!(
                "Your skip vote has been counted ({votes}/{}).",
                present.len()
            )),
            Tally::Pass => {
                let (retired, next) = inner.queue.pop_current_and_advance();
                let next = next.cloned();
                inner.votes.clear();
                inner.paused = false;

                // retired is always Some here; current was checked above
                let retired_title = retired
                    .as_ref()
                    .map(|t| t.title.clone())
                    .unwrap_or_default();

                match next {
                    Some(next) => {
                        if let Err(e) = self.backend.play(guild, &next).await {
                            return CommandOutcome::fail(format!("❌ {e}"));
                        }
                        CommandOutcome::ok(format!(
                            "Skipped {retired_title}. Now playing: {}.",
                            next.title
                        ))
                    }
                    None => {
                        if let Some(retired) = &retired {
                            if let Err(e) = self.backend.stop(guild, retired).await {
                                return CommandOutcome::fail(format!("❌ {e}"));
                            }
                        }
                        CommandOutcome::ok(format!("Skipped {retired_title}. The queue is empty."))
                    }
                }
            }
        }
    }

    /// Pause the current track
    pub async fn pause(&self, guild: GuildId) -> CommandOutcome {
        let Some(session) = self.registry.get(guild).await else {
            return CommandOutcome::fail("Nothing is playing right now.");
        };

        let mut inner = session.lock().await;
        if inner.state != ConnectionState::Connected {
            return CommandOutcome::fail("Nothing is playing right now.");
        }
        let Some(track) = inner.queue.current().cloned() else {
            return CommandOutcome::fail("Nothing is playing right now.");
        };
        if inner.paused {
            return CommandOutcome::fail("Playback is already paused.");
        }

        if let Err(e) = self.backend.pause(guild, &track).await {
            return CommandOutcome::fail(format!("❌ {e}"));
        }
        inner.paused = true;
        CommandOutcome::ok("Paused the current track.")
    }

    /// Resume a paused track
    pub async fn resume(&self, guild: GuildId) -> CommandOutcome {
        let Some(session) = self.registry.get(guild).await else {
            return CommandOutcome::fail("Nothing is playing right now.");
        };

        let mut inner = session.lock().await;
        let Some(track) = inner.queue.current().cloned() else {
            return CommandOutcome::fail("Nothing is playing right now.");
        };
        if !inner.paused {
            return CommandOutcome::fail("I cannot resume when nothing is paused!");
        }

        if let Err(e) = self.backend.resume(guild, &track).await {
            return CommandOutcome::fail(format!("❌ {e}"));
        }
        inner.paused = false;
        CommandOutcome::ok("Resumed playback.")
    }

    /// Leave the user's voice channel and drop the session
    pub async fn leave(
        &self,
        guild: GuildId,
        user_voice_channel: Option<ChannelId>,
    ) -> CommandOutcome {
        let Some(channel) = user_voice_channel else {
            return CommandOutcome::fail("Not sure which voice channel to disconnect from.");
        };

        match self.disconnect(guild).await {
            Ok(Some(_)) => CommandOutcome::ok(format!("I've left {}!", channel.mention())),
            Ok(None) => CommandOutcome::fail("I'm not connected to a voice channel."),
            Err(e) => CommandOutcome::fail(format!("❌ {e}")),
        }
    }

    // ========================================================================
    // Bridge-facing operations (caller supplies the target channel)
    // ========================================================================

    /// Session for the guild, creating and connecting one when absent.
    ///
    /// Unlike [`SessionController::join`] there is no requesting user, so
    /// no voice-presence check applies.
    pub async fn ensure_joined(
        &self,
        guild: GuildId,
        voice_channel: ChannelId,
        notify_channel: ChannelId,
    ) -> Result<Arc<GuildSession>> {
        if let Some(session) = self.registry.get(guild).await {
            return Ok(session);
        }
        self.connect(guild, voice_channel, Some(notify_channel)).await
    }

    /// Start (or replace) the session's current track immediately.
    ///
    /// The pending queue is not touched: the bridge only ever manages the
    /// single stream track it created.
    pub async fn play_now(&self, guild: GuildId, track: Track) -> Result<()> {
        let session = self
            .registry
            .get(guild)
            .await
            .ok_or(Error::NoSession(guild))?;

        let mut inner = session.lock().await;
        self.backend
            .play(guild, &track)
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;
        inner.queue.begin(track);
        inner.votes.clear();
        inner.paused = false;
        Ok(())
    }

    /// Tear a session down from any state.
    ///
    /// Returns the voice channel that was bound, or `None` when no session
    /// existed (a no-op, not an error). Local state is cleaned up even when
    /// the backend refuses the leave; that failure is still reported.
    pub async fn disconnect(&self, guild: GuildId) -> Result<Option<ChannelId>> {
        let Some(session) = self.registry.get(guild).await else {
            return Ok(None);
        };

        let mut inner = session.lock().await;
        let channel = inner.voice_channel;

        let backend_result = if inner.state == ConnectionState::Connected {
            self.backend.leave_channel(guild, channel).await
        } else {
            Ok(())
        };

        inner.state = ConnectionState::Disconnected;
        inner.queue.clear();
        inner.votes.clear();
        inner.paused = false;
        drop(inner);

        self.registry.remove(guild).await;

        match backend_result {
            Ok(()) => Ok(Some(channel)),
            Err(e) => {
                warn!(guild = %guild, error = %e, "Backend leave failed during disconnect");
                Err(Error::Backend(e.to_string()))
            }
        }
    }

    /// Current track of a guild's session, if any
    pub async fn now_playing(&self, guild: GuildId) -> Option<Track> {
        let session = self.registry.get(guild).await?;
        let inner = session.lock().await;
        inner.queue.current().cloned()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Register a session and establish the voice connection.
    ///
    /// On backend failure the half-created session is removed again so the
    /// registry never holds a session without a connection attempt behind
    /// it.
    async fn connect(
        &self,
        guild: GuildId,
        channel: ChannelId,
        notify_channel: Option<ChannelId>,
    ) -> Result<Arc<GuildSession>> {
        let session = self
            .registry
            .create(guild, channel, self.quorum_percent)
            .await?;

        let mut inner = session.lock().await;
        inner.notify_channel = notify_channel;

        match self.backend.join_channel(guild, channel).await {
            Ok(()) => {
                inner.state = ConnectionState::Connected;
                drop(inner);
                debug!(guild = %guild, channel = %channel, "Voice connection established");
                Ok(session)
            }
            Err(e) => {
                inner.state = ConnectionState::Disconnected;
                drop(inner);
                self.registry.remove(guild).await;
                Err(Error::Backend(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use briarsource::{LoadRequest, LoadResult};
    use std::sync::Mutex as StdMutex;

    /// Backend fake recording every call, with scriptable load results and
    /// failure switches.
    #[derive(Default)]
    struct FakeBackend {
        calls: StdMutex<Vec<String>>,
        load_result: StdMutex<Option<LoadResult>>,
        fail_join: StdMutex<bool>,
    }

    impl FakeBackend {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn with_tracks(titles: &[&str]) -> Arc<Self> {
            let backend = Self::new();
            backend.set_tracks(titles);
            backend
        }

        fn set_tracks(&self, titles: &[&str]) {
            let tracks = titles
                .iter()
                .map(|t| Track::new(*t, format!("uri:{t}")))
                .collect();
            *self.load_result.lock().unwrap() = Some(LoadResult::Loaded(tracks));
        }

        fn set_fail_join(&self, fail: bool) {
            *self.fail_join.lock().unwrap() = fail;
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }
    }

    #[async_trait]
    impl AudioBackend for FakeBackend {
        async fn join_channel(
            &self,
            guild: GuildId,
            channel: ChannelId,
        ) -> briarsource::Result<()> {
            self.record(format!("join:{guild}:{channel}"));
            if *self.fail_join.lock().unwrap() {
                return Err(briarsource::Error::unavailable("node down"));
            }
            Ok(())
        }
        async fn leave_channel(
            &self,
            guild: GuildId,
            channel: ChannelId,
        ) -> briarsource::Result<()> {
            self.record(format!("leave:{guild}:{channel}"));
            Ok(())
        }
        async fn load(&self, _: &LoadRequest) -> briarsource::Result<LoadResult> {
            Ok(self
                .load_result
                .lock()
                .unwrap()
                .clone()
                .unwrap_or(LoadResult::Empty))
        }
        async fn play(&self, guild: GuildId, track: &Track) -> briarsource::Result<()> {
            self.record(format!("play:{guild}:{}", track.title));
            Ok(())
        }
        async fn stop(&self, guild: GuildId, track: &Track) -> briarsource::Result<()> {
            self.record(format!("stop:{guild}:{}", track.title));
            Ok(())
        }
        async fn pause(&self, guild: GuildId, track: &Track) -> briarsource::Result<()> {
            self.record(format!("pause:{guild}:{}", track.title));
            Ok(())
        }
        async fn resume(&self, guild: GuildId, track: &Track) -> briarsource::Result<()> {
            self.record(format!("resume:{guild}:{}", track.title));
            Ok(())
        }
        async fn is_connected(&self, _: GuildId) -> bool {
            true
        }
        async fn become_speaker(&self, guild: GuildId, _: ChannelId) -> briarsource::Result<()> {
            self.record(format!("become_speaker:{guild}"));
            Ok(())
        }
        async fn request_to_speak(&self, guild: GuildId, _: ChannelId) -> briarsource::Result<()> {
            self.record(format!("request_to_speak:{guild}"));
            Ok(())
        }
    }

    const GUILD: GuildId = GuildId(1);
    const VOICE: ChannelId = ChannelId(10);
    const NOTIFY: ChannelId = ChannelId(20);

    fn controller(backend: &Arc<FakeBackend>) -> SessionController {
        SessionController::new(backend.clone(), 85)
    }

    #[tokio::test]
    async fn test_join_requires_voice_channel() {
        let backend = FakeBackend::new();
        let ctl = controller(&backend);

        let outcome = ctl.join(GUILD, None, NOTIFY).await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "You must be connected to a voice channel!");
        assert!(ctl.registry().get(GUILD).await.is_none());
    }

    #[tokio::test]
    async fn test_join_then_rejoin() {
        let backend = FakeBackend::new();
        let ctl = controller(&backend);

        let outcome = ctl.join(GUILD, Some(VOICE), NOTIFY).await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Joined <#10>!");

        let session = ctl.registry().get(GUILD).await.unwrap();
        assert_eq!(session.lock().await.state, ConnectionState::Connected);
        assert_eq!(session.lock().await.notify_channel, Some(NOTIFY));

        let again = ctl.join(GUILD, Some(VOICE), NOTIFY).await;
        assert!(!again.success);
        assert_eq!(ctl.registry().len().await, 1);
    }

    #[tokio::test]
    async fn test_failed_join_tears_session_down() {
        let backend = FakeBackend::new();
        backend.set_fail_join(true);
        let ctl = controller(&backend);

        let outcome = ctl.join(GUILD, Some(VOICE), NOTIFY).await;
        assert!(!outcome.success);
        assert!(ctl.registry().get(GUILD).await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_joins_one_winner() {
        let backend = FakeBackend::new();
        let ctl = Arc::new(controller(&backend));

        let a = {
            let ctl = ctl.clone();
            tokio::spawn(async move { ctl.join(GUILD, Some(VOICE), NOTIFY).await })
        };
        let b = {
            let ctl = ctl.clone();
            tokio::spawn(async move { ctl.join(GUILD, Some(VOICE), NOTIFY).await })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert!(a.success != b.success, "exactly one join must succeed");
        assert_eq!(ctl.registry().len().await, 1);
    }

    #[tokio::test]
    async fn test_play_joins_implicitly_and_plays() {
        let backend = FakeBackend::with_tracks(&["Song A"]);
        let ctl = controller(&backend);

        let outcome = ctl.play(GUILD, "song a", Some(VOICE), NOTIFY).await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Now playing: Song A");
        assert_eq!(
            backend.calls(),
            vec!["join:1:10".to_string(), "play:1:Song A".to_string()]
        );
    }

    #[tokio::test]
    async fn test_play_enqueues_when_busy() {
        let backend = FakeBackend::with_tracks(&["Song A"]);
        let ctl = controller(&backend);

        ctl.play(GUILD, "a", Some(VOICE), NOTIFY).await;
        backend.set_tracks(&["Song B"]);
        let outcome = ctl.play(GUILD, "b", Some(VOICE), NOTIFY).await;

        assert!(outcome.success);
        assert_eq!(outcome.message, "Added Song B to queue.");
        let session = ctl.registry().get(GUILD).await.unwrap();
        let inner = session.lock().await;
        assert_eq!(inner.queue.current().unwrap().title, "Song A");
        assert_eq!(inner.queue.len(), 1);
    }

    #[tokio::test]
    async fn test_play_empty_query() {
        let backend = FakeBackend::new();
        let ctl = controller(&backend);
        let outcome = ctl.play(GUILD, "   ", Some(VOICE), NOTIFY).await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Please provide search terms.");
    }

    #[tokio::test]
    async fn test_play_no_results() {
        let backend = FakeBackend::new(); // load_result defaults to Empty
        let ctl = controller(&backend);
        let outcome = ctl.play(GUILD, "nothing here", Some(VOICE), NOTIFY).await;
        assert!(!outcome.success);
        assert_eq!(
            outcome.message,
            "I wasn't able to find anything for `nothing here`."
        );
        // Implicit join happened before resolution; session exists but idle
        let session = ctl.registry().get(GUILD).await.unwrap();
        assert!(session.lock().await.queue.is_idle());
    }

    #[tokio::test]
    async fn test_stop_without_track() {
        let backend = FakeBackend::new();
        let ctl = controller(&backend);

        let outcome = ctl.stop(GUILD).await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Woah, can't stop won't stop.");
    }

    #[tokio::test]
    async fn test_stop_leaves_queue_intact() {
        let backend = FakeBackend::with_tracks(&["Song A"]);
        let ctl = controller(&backend);

        ctl.play(GUILD, "a", Some(VOICE), NOTIFY).await;
        backend.set_tracks(&["Song B"]);
        ctl.play(GUILD, "b", Some(VOICE), NOTIFY).await;

        let outcome = ctl.stop(GUILD).await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "No longer playing anything.");

        // Stop retires the current track only: the queue stays untouched
        // and does not restart on its own.
        let session = ctl.registry().get(GUILD).await.unwrap();
        {
            let inner = session.lock().await;
            assert!(inner.queue.current().is_none());
            assert_eq!(inner.queue.len(), 1);
        }

        // A new play becomes current without consuming the old queue
        backend.set_tracks(&["Song C"]);
        let outcome = ctl.play(GUILD, "c", Some(VOICE), NOTIFY).await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Now playing: Song C");
        let inner = session.lock().await;
        assert_eq!(inner.queue.current().unwrap().title, "Song C");
        assert_eq!(inner.queue.len(), 1);
    }

    #[tokio::test]
    async fn test_skip_quorum() {
        let backend = FakeBackend::with_tracks(&["Song A"]);
        let ctl = controller(&backend);
        ctl.play(GUILD, "a", Some(VOICE), NOTIFY).await;
        backend.set_tracks(&["Song B"]);
        ctl.play(GUILD, "b", Some(VOICE), NOTIFY).await;

        let present: Vec<UserId> = (1..=5).map(UserId).collect();

        // 4 of 5 votes: 80, below the strict 85 threshold
        for n in 1..=4 {
            let outcome = ctl.skip(GUILD, UserId(n), &present).await;
            assert!(outcome.success, "{}", outcome.message);
            assert!(outcome.message.contains(&format!("({n}/5)")));
        }

        // 5th distinct vote: 100, passes and advances to Song B
        let outcome = ctl.skip(GUILD, UserId(5), &present).await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Skipped Song A. Now playing: Song B.");

        let session = ctl.registry().get(GUILD).await.unwrap();
        let inner = session.lock().await;
        assert_eq!(inner.queue.current().unwrap().title, "Song B");
        assert!(inner.votes.is_empty());
    }

    #[tokio::test]
    async fn test_skip_duplicate_vote() {
        let backend = FakeBackend::with_tracks(&["Song A"]);
        let ctl = controller(&backend);
        ctl.play(GUILD, "a", Some(VOICE), NOTIFY).await;

        let present: Vec<UserId> = (1..=5).map(UserId).collect();
        ctl.skip(GUILD, UserId(1), &present).await;
        let outcome = ctl.skip(GUILD, UserId(1), &present).await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "You've already voted to skip this track!");
    }

    #[tokio::test]
    async fn test_skip_vote_from_absent_user_rejected() {
        let backend = FakeBackend::with_tracks(&["Song A"]);
        let ctl = controller(&backend);
        ctl.play(GUILD, "a", Some(VOICE), NOTIFY).await;

        // One occupant, a vote from outside the channel: without the
        // presence check this would tally 1/1 = 100 and skip the track
        // with zero consenting occupants.
        let outcome = ctl.skip(GUILD, UserId(9), &[UserId(1)]).await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "You must be in the voice channel to vote!");

        let session = ctl.registry().get(GUILD).await.unwrap();
        let inner = session.lock().await;
        assert_eq!(inner.queue.current().unwrap().title, "Song A");
        assert!(inner.votes.is_empty());
    }

    #[tokio::test]
    async fn test_skip_with_empty_channel_rejected() {
        let backend = FakeBackend::with_tracks(&["Song A"]);
        let ctl = controller(&backend);
        ctl.play(GUILD, "a", Some(VOICE), NOTIFY).await;

        // Nobody in the channel means the caster isn't either.
        let outcome = ctl.skip(GUILD, UserId(1), &[]).await;
        assert!(!outcome.success);
        let session = ctl.registry().get(GUILD).await.unwrap();
        assert_eq!(session.lock().await.queue.current().unwrap().title, "Song A");
    }

    #[tokio::test]
    async fn test_skip_to_empty_queue_stops() {
        let backend = FakeBackend::with_tracks(&["Song A"]);
        let ctl = controller(&backend);
        ctl.play(GUILD, "a", Some(VOICE), NOTIFY).await;

        let outcome = ctl.skip(GUILD, UserId(1), &[UserId(1)]).await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Skipped Song A. The queue is empty.");
        assert!(backend.calls().contains(&"stop:1:Song A".to_string()));
    }

    #[tokio::test]
    async fn test_pause_resume_cycle() {
        let backend = FakeBackend::with_tracks(&["Song A"]);
        let ctl = controller(&backend);
        ctl.play(GUILD, "a", Some(VOICE), NOTIFY).await;

        let outcome = ctl.resume(GUILD).await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "I cannot resume when nothing is paused!");

        assert!(ctl.pause(GUILD).await.success);
        let outcome = ctl.pause(GUILD).await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Playback is already paused.");

        let outcome = ctl.resume(GUILD).await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Resumed playback.");
    }

    #[tokio::test]
    async fn test_leave() {
        let backend = FakeBackend::with_tracks(&["Song A"]);
        let ctl = controller(&backend);
        ctl.play(GUILD, "a", Some(VOICE), NOTIFY).await;

        let outcome = ctl.leave(GUILD, Some(VOICE)).await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "I've left <#10>!");
        assert!(ctl.registry().get(GUILD).await.is_none());
        assert!(backend.calls().contains(&"leave:1:10".to_string()));

        // Leaving again: no session left
        let outcome = ctl.leave(GUILD, Some(VOICE)).await;
        assert!(!outcome.success);

        // No channel to leave from
        let outcome = ctl.leave(GUILD, None).await;
        assert_eq!(
            outcome.message,
            "Not sure which voice channel to disconnect from."
        );
    }

    #[tokio::test]
    async fn test_bridge_disconnect_is_noop_without_session() {
        let backend = FakeBackend::new();
        let ctl = controller(&backend);
        assert!(matches!(ctl.disconnect(GUILD).await, Ok(None)));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_bridge_ensure_joined_and_play_now() {
        let backend = FakeBackend::new();
        let ctl = controller(&backend);

        let session = ctl.ensure_joined(GUILD, VOICE, NOTIFY).await.unwrap();
        assert_eq!(session.lock().await.state, ConnectionState::Connected);

        // Idempotent: reuses the existing session
        ctl.ensure_joined(GUILD, VOICE, NOTIFY).await.unwrap();
        assert_eq!(ctl.registry().len().await, 1);

        ctl.play_now(GUILD, Track::new("Live Stream", "http://radio:8000"))
            .await
            .unwrap();
        assert_eq!(ctl.now_playing(GUILD).await.unwrap().title, "Live Stream");
    }

    #[tokio::test]
    async fn test_unrelated_guilds_do_not_interfere() {
        let backend = FakeBackend::with_tracks(&["Song A"]);
        let ctl = controller(&backend);

        ctl.play(GuildId(1), "a", Some(ChannelId(10)), NOTIFY).await;
        ctl.play(GuildId(2), "a", Some(ChannelId(20)), NOTIFY).await;

        assert!(ctl.stop(GuildId(1)).await.success);
        // Guild 2 still playing
        assert_eq!(ctl.now_playing(GuildId(2)).await.unwrap().title, "Song A");
    }
}
