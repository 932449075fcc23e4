//! Per-stream monitor loop
//!
//! One [`StreamMonitor`] runs per configured stream, polling the status
//! endpoint on a fixed interval and driving the guild session through the
//! controller: join and play when the stream comes up, announce title
//! changes, leave when it goes down. The loop runs until the shutdown
//! token fires; no single cycle failure stops it.

use crate::error::Result;
use crate::status::StatusSource;
use briarsession::SessionController;
use briarsource::{ChannelId, GuildId, Notifier, TrackResolver};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default polling interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Where a monitored stream is delivered
#[derive(Debug, Clone)]
pub struct StreamBinding {
    /// Stream URL, both the status host and the playback identifier
    pub url: String,
    pub guild: GuildId,
    pub voice_channel: ChannelId,
    pub notify_channel: ChannelId,
    /// Whether the voice channel is a moderated stage channel
    pub stage_channel: bool,
    pub poll_interval: Duration,
}

/// What one poll observation means, given the previous one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed
    None,
    /// The stream came up with this title
    WentOnline(String),
    /// Still up, but the title changed
    TitleChanged(String),
    /// The stream went down
    WentOffline,
}

/// Poll-to-poll stream state.
///
/// Online flag and last title are only ever updated together, by
/// [`MonitorState::observe`]; a title change while online is never
/// reported as an online transition.
#[derive(Debug, Default)]
pub struct MonitorState {
    last_title: String,
    online: bool,
}

impl MonitorState {
    /// Create the initial (offline) state
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the stream was online at the last observation
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Fold one observation into the state and classify the transition.
    ///
    /// `title` is the raw reported title; `None` or blank means offline.
    /// A fetch failure is fed in as `None`: it only produces a
    /// [`Transition::WentOffline`] if the stream was previously seen
    /// online, so a dead endpoint never spams offline notifications.
    pub fn observe(&mut self, title: Option<&str>) -> Transition {
        let normalized = title.unwrap_or("").trim().to_string();
        let is_online = !normalized.is_empty();

        let transition = if is_online && !self.online {
            Transition::WentOnline(normalized.clone())
        } else if is_online && self.last_title != normalized {
            Transition::TitleChanged(normalized.clone())
        } else if !is_online && self.online {
            Transition::WentOffline
        } else {
            Transition::None
        };

        self.last_title = normalized;
        self.online = is_online;
        transition
    }
}

/// Long-lived bridge between one stream and one guild session
pub struct StreamMonitor {
    binding: StreamBinding,
    status: Arc<dyn StatusSource>,
    controller: Arc<SessionController>,
    resolver: TrackResolver,
    notifier: Arc<dyn Notifier>,
    state: MonitorState,
}

impl StreamMonitor {
    /// Create a monitor; it does nothing until [`StreamMonitor::run`]
    pub fn new(
        binding: StreamBinding,
        status: Arc<dyn StatusSource>,
        controller: Arc<SessionController>,
        resolver: TrackResolver,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            binding,
            status,
            controller,
            resolver,
            notifier,
            state: MonitorState::new(),
        }
    }

    /// Poll until the token is cancelled
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            stream = %self.binding.url,
            guild = %self.binding.guild,
            interval = ?self.binding.poll_interval,
            "Stream monitor started"
        );

        let mut interval = tokio::time::interval(self.binding.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!(stream = %self.binding.url, "Stream monitor stopping");
                    break;
                }
                _ = interval.tick() => {
                    self.cycle().await;
                }
            }
        }
    }

    /// One full poll cycle, including any session side effects.
    ///
    /// Never returns an error: every failure is logged and the next cycle
    /// starts from the persisted state.
    pub async fn cycle(&mut self) {
        let observed = match self.status.current_title().await {
            Ok(title) => title,
            Err(e) => {
                debug!(stream = %self.binding.url, error = %e, "Status fetch failed");
                None
            }
        };

        match self.state.observe(observed.as_deref()) {
            Transition::None => {}
            Transition::WentOnline(title) => {
                self.notify(&format!("🎵 Stream is online! Now playing: **{title}**"))
                    .await;
                if let Err(e) = self.join_and_play().await {
                    warn!(
                        stream = %self.binding.url,
                        guild = %self.binding.guild,
                        error = %e,
                        "Failed to join and play stream"
                    );
                }
            }
            Transition::TitleChanged(title) => {
                self.notify(&format!("🎶 Now playing: **{title}**")).await;
            }
            Transition::WentOffline => {
                self.notify("❌ Stream went offline!").await;
                if let Err(e) = self.controller.disconnect(self.binding.guild).await {
                    warn!(
                        guild = %self.binding.guild,
                        error = %e,
                        "Failed to leave after stream went offline"
                    );
                }
            }
        }
    }

    /// Join the bound voice channel and start the stream track
    async fn join_and_play(&self) -> Result<()> {
        self.controller
            .ensure_joined(
                self.binding.guild,
                self.binding.voice_channel,
                self.binding.notify_channel,
            )
            .await?;

        if self.binding.stage_channel {
            self.promote_to_speaker().await;
        }

        let track = self.resolver.resolve(&self.binding.url).await?;
        self.controller.play_now(self.binding.guild, track).await?;
        Ok(())
    }

    /// Try to become a speaker in the stage channel, falling back to a
    /// speak request. Both failures are only logged.
    async fn promote_to_speaker(&self) {
        let backend = self.resolver.backend();
        match backend
            .become_speaker(self.binding.guild, self.binding.voice_channel)
            .await
        {
            Ok(()) => {}
            Err(e) => {
                warn!(
                    guild = %self.binding.guild,
                    error = %e,
                    "Speaker promotion denied, requesting to speak instead"
                );
                if let Err(e) = backend
                    .request_to_speak(self.binding.guild, self.binding.voice_channel)
                    .await
                {
                    warn!(guild = %self.binding.guild, error = %e, "Request to speak failed");
                }
            }
        }
    }

    async fn notify(&self, message: &str) {
        if let Err(e) = self
            .notifier
            .send(self.binding.notify_channel, message)
            .await
        {
            warn!(
                channel = %self.binding.notify_channel,
                error = %e,
                "Failed to send stream notification"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use briarsource::{AudioBackend, LoadRequest, LoadResult, Track};
    use std::sync::Mutex as StdMutex;

    // ========================================================================
    // Pure transition logic
    // ========================================================================

    #[test]
    fn test_poll_sequence_produces_exact_transitions() {
        let mut state = MonitorState::new();

        let polls: [Option<&str>; 6] = [
            None,
            None,
            Some("Song A"),
            Some("Song A"),
            Some("Song B"),
            None,
        ];
        let transitions: Vec<Transition> = polls.iter().map(|p| state.observe(*p)).collect();

        assert_eq!(
            transitions,
            vec![
                Transition::None,
                Transition::None,
                Transition::WentOnline("Song A".to_string()),
                Transition::None,
                Transition::TitleChanged("Song B".to_string()),
                Transition::WentOffline,
            ]
        );
        assert!(!state.is_online());
    }

    #[test]
    fn test_blank_title_is_offline() {
        let mut state = MonitorState::new();
        assert_eq!(state.observe(Some("   ")), Transition::None);
        assert!(!state.is_online());

        state.observe(Some("Song"));
        assert_eq!(state.observe(Some("")), Transition::WentOffline);
    }

    #[test]
    fn test_title_is_trimmed() {
        let mut state = MonitorState::new();
        assert_eq!(
            state.observe(Some("  Song A  ")),
            Transition::WentOnline("Song A".to_string())
        );
        // Same title with different surrounding whitespace is not a change
        assert_eq!(state.observe(Some("Song A ")), Transition::None);
    }

    #[test]
    fn test_going_online_is_never_reported_as_title_change() {
        let mut state = MonitorState::new();
        state.observe(Some("Song A"));
        state.observe(None);
        // Back online with a different title: one online event, nothing else
        assert_eq!(
            state.observe(Some("Song B")),
            Transition::WentOnline("Song B".to_string())
        );
    }

    // ========================================================================
    // Full cycle with scripted collaborators
    // ========================================================================

    struct ScriptedStatus {
        polls: StdMutex<std::vec::IntoIter<Result<Option<String>>>>,
    }

    impl ScriptedStatus {
        fn new(polls: Vec<Result<Option<String>>>) -> Arc<Self> {
            Arc::new(Self {
                polls: StdMutex::new(polls.into_iter()),
            })
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedStatus {
        async fn current_title(&self) -> Result<Option<String>> {
            self.polls.lock().unwrap().next().unwrap_or(Ok(None))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: StdMutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, _channel: ChannelId, message: &str) -> anyhow::Result<()> {
            self.messages.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct StreamBackend {
        calls: StdMutex<Vec<String>>,
    }

    impl StreamBackend {
        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }
    }

    #[async_trait]
    impl AudioBackend for StreamBackend {
        async fn join_channel(&self, g: GuildId, c: ChannelId) -> briarsource::Result<()> {
            self.record(format!("join:{g}:{c}"));
            Ok(())
        }
        async fn leave_channel(&self, g: GuildId, c: ChannelId) -> briarsource::Result<()> {
            self.record(format!("leave:{g}:{c}"));
            Ok(())
        }
        async fn load(&self, request: &LoadRequest) -> briarsource::Result<LoadResult> {
            let LoadRequest::DirectUrl(url) = request else {
                return Ok(LoadResult::Empty);
            };
            Ok(LoadResult::Loaded(vec![Track::new("Live Stream", url)]))
        }
        async fn play(&self, g: GuildId, t: &Track) -> briarsource::Result<()> {
            self.record(format!("play:{g}:{}", t.uri));
            Ok(())
        }
        async fn stop(&self, g: GuildId, t: &Track) -> briarsource::Result<()> {
            self.record(format!("stop:{g}:{}", t.uri));
            Ok(())
        }
        async fn pause(&self, _: GuildId, _: &Track) -> briarsource::Result<()> {
            Ok(())
        }
        async fn resume(&self, _: GuildId, _: &Track) -> briarsource::Result<()> {
            Ok(())
        }
        async fn is_connected(&self, _: GuildId) -> bool {
            true
        }
        async fn become_speaker(&self, g: GuildId, _: ChannelId) -> briarsource::Result<()> {
            self.record(format!("become_speaker:{g}"));
            Err(briarsource::Error::unavailable("missing permission"))
        }
        async fn request_to_speak(&self, g: GuildId, _: ChannelId) -> briarsource::Result<()> {
            self.record(format!("request_to_speak:{g}"));
            Ok(())
        }
    }

    fn monitor(
        polls: Vec<Result<Option<String>>>,
        stage_channel: bool,
    ) -> (StreamMonitor, Arc<StreamBackend>, Arc<RecordingNotifier>) {
        let backend = Arc::new(StreamBackend::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let controller = Arc::new(SessionController::new(backend.clone(), 85));

        let binding = StreamBinding {
            url: "http://radio.example:8000/live".to_string(),
            guild: GuildId(1),
            voice_channel: ChannelId(10),
            notify_channel: ChannelId(20),
            stage_channel,
            poll_interval: DEFAULT_POLL_INTERVAL,
        };

        let monitor = StreamMonitor::new(
            binding,
            ScriptedStatus::new(polls),
            controller,
            TrackResolver::new(backend.clone()),
            notifier.clone(),
        );
        (monitor, backend, notifier)
    }

    fn fetch_err() -> crate::error::Error {
        briarsource::Error::unavailable("connection refused").into()
    }

    #[tokio::test]
    async fn test_online_cycle_joins_and_plays() {
        let (mut monitor, backend, notifier) =
            monitor(vec![Ok(Some("Song A".to_string()))], false);

        monitor.cycle().await;

        assert_eq!(
            notifier.messages.lock().unwrap().as_slice(),
            ["🎵 Stream is online! Now playing: **Song A**"]
        );
        assert_eq!(
            backend.calls.lock().unwrap().as_slice(),
            [
                "join:1:10".to_string(),
                "play:1:http://radio.example:8000/live".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_title_change_notifies_without_rejoin() {
        let (mut monitor, backend, notifier) = monitor(
            vec![Ok(Some("Song A".to_string())), Ok(Some("Song B".to_string()))],
            false,
        );

        monitor.cycle().await;
        monitor.cycle().await;

        let messages = notifier.messages.lock().unwrap();
        assert_eq!(messages[1], "🎶 Now playing: **Song B**");
        // Exactly one join across both cycles
        let joins = backend
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with("join"))
            .count();
        assert_eq!(joins, 1);
    }

    #[tokio::test]
    async fn test_offline_cycle_leaves() {
        let (mut monitor, backend, notifier) =
            monitor(vec![Ok(Some("Song A".to_string())), Ok(None)], false);

        monitor.cycle().await;
        monitor.cycle().await;

        assert_eq!(
            notifier.messages.lock().unwrap().last().unwrap(),
            "❌ Stream went offline!"
        );
        assert!(backend
            .calls
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.starts_with("leave:1:")));
    }

    #[tokio::test]
    async fn test_fetch_failure_before_first_online_stays_silent() {
        let (mut monitor, backend, notifier) = monitor(vec![Err(fetch_err())], false);

        monitor.cycle().await;

        assert!(notifier.messages.lock().unwrap().is_empty());
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_while_online_is_offline() {
        let (mut monitor, _backend, notifier) =
            monitor(vec![Ok(Some("Song A".to_string())), Err(fetch_err())], false);

        monitor.cycle().await;
        monitor.cycle().await;

        assert_eq!(
            notifier.messages.lock().unwrap().last().unwrap(),
            "❌ Stream went offline!"
        );
    }

    #[tokio::test]
    async fn test_stage_channel_promotion_degrades_to_request() {
        let (mut monitor, backend, _notifier) =
            monitor(vec![Ok(Some("Song A".to_string()))], true);

        monitor.cycle().await;

        let calls = backend.calls.lock().unwrap();
        assert!(calls.contains(&"become_speaker:1".to_string()));
        assert!(calls.contains(&"request_to_speak:1".to_string()));
    }

    #[tokio::test]
    async fn test_bridge_leave_does_not_touch_manual_queue() {
        let backend = Arc::new(StreamBackend::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let controller = Arc::new(SessionController::new(backend.clone(), 85));

        // A user queued something manually before the stream came up
        controller
            .play(GuildId(1), "http://a.example/song", Some(ChannelId(10)), ChannelId(20))
            .await;

        let binding = StreamBinding {
            url: "http://radio.example:8000/live".to_string(),
            guild: GuildId(2),
            voice_channel: ChannelId(11),
            notify_channel: ChannelId(21),
            stage_channel: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
        };
        let mut monitor = StreamMonitor::new(
            binding,
            ScriptedStatus::new(vec![Ok(Some("Song A".to_string())), Ok(None)]),
            controller.clone(),
            TrackResolver::new(backend.clone()),
            notifier,
        );

        monitor.cycle().await;
        monitor.cycle().await;

        // The unrelated guild's session is untouched
        assert!(controller.now_playing(GuildId(1)).await.is_some());
        assert!(controller.now_playing(GuildId(2)).await.is_none());
    }
}
