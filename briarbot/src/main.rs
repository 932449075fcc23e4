use briarbridge::{IcecastClient, StreamBinding, StreamMonitor};
use briarconfig::Config;
use briarlink::{LavaNode, NodeProcess};
use briarmonitor::{StorageHealthReporter, UptimePinger};
use briarsession::SessionController;
use briarsource::{AudioBackend, ChannelId, GuildId, Notifier, TrackResolver};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{reload, EnvFilter};

mod notify;

use notify::{LogNotifier, WebhookNotifier};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ========== PHASE 1 : Configuration & logging ==========

    // The subscriber goes up before the config loads so the config-source
    // log lines land somewhere; the configured level is applied afterwards
    // through the reload handle unless RUST_LOG already decided it.
    let env_filter = std::env::var(EnvFilter::DEFAULT_ENV).is_ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter, filter_handle) = reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::load("")?);
    if !env_filter {
        filter_handle.reload(EnvFilter::new(config.log_min_level()))?;
    }

    info!("🎛️ BriarBot starting...");

    // ========== PHASE 2 : Audio node ==========

    let node = LavaNode::builder()
        .base_url(config.node_base_url())
        .password(config.node_password())
        .session_id(config.node_session_id())
        .default_search(config.node_default_search())
        .build()?;
    let (host, port) = node.socket_addr()?;

    let mut node_process = None;
    if config.node_spawn() && !NodeProcess::probe(&host, port).await {
        info!("📡 No audio node reachable, spawning one...");
        let jar_path = config.node_jar_path();
        let process = NodeProcess::spawn(&config.node_java_path(), Path::new(&jar_path))?;
        NodeProcess::wait_ready(
            &host,
            port,
            Duration::from_secs(config.node_ready_timeout_secs()),
        )
        .await?;
        node_process = Some(process);
    }

    let backend: Arc<dyn AudioBackend> = Arc::new(node);
    let controller = Arc::new(SessionController::new(
        backend.clone(),
        config.quorum_percent(),
    ));

    let notifier: Arc<dyn Notifier> = match config.webhook_url().as_str() {
        "" => Arc::new(LogNotifier),
        url => Arc::new(WebhookNotifier::new(url)),
    };

    // ========== PHASE 3 : Background tasks ==========

    let shutdown = CancellationToken::new();
    let mut tasks = Vec::new();

    let streams = config.streams()?;
    info!("📻 Starting {} stream monitor(s)...", streams.len());
    for stream in streams {
        let binding = StreamBinding {
            url: stream.url.clone(),
            guild: GuildId(stream.guild_id),
            voice_channel: ChannelId(stream.voice_channel_id),
            notify_channel: ChannelId(stream.notify_channel_id),
            stage_channel: stream.stage_channel,
            poll_interval: Duration::from_secs(stream.poll_interval_secs),
        };
        let monitor = StreamMonitor::new(
            binding,
            Arc::new(IcecastClient::new(stream.url)),
            controller.clone(),
            TrackResolver::new(backend.clone()),
            notifier.clone(),
        );
        tasks.push(tokio::spawn(monitor.run(shutdown.clone())));
    }

    if config.uptime_enabled() {
        let pinger = UptimePinger::new(
            config.uptime_push_url(),
            Duration::from_secs(config.uptime_interval_secs()),
        );
        tasks.push(tokio::spawn(pinger.run(shutdown.clone())));
    }

    if config.storage_enabled() {
        let reporter = StorageHealthReporter::new(
            config.storage_base_url(),
            config.storage_api_key(),
            ChannelId(config.storage_notify_channel_id()),
            notifier.clone(),
            Duration::from_secs(config.storage_interval_secs()),
        );
        tasks.push(tokio::spawn(reporter.run(shutdown.clone())));
    }

    // ========== PHASE 4 : Run until shutdown ==========

    info!("✅ BriarBot is ready!");
    info!("Press Ctrl+C to stop...");
    tokio::signal::ctrl_c().await?;

    info!("🛑 Shutting down...");
    shutdown.cancel();
    for task in tasks {
        let _ = task.await;
    }

    for guild in controller.registry().guilds().await {
        let _ = controller.disconnect(guild).await;
    }

    if let Some(mut process) = node_process {
        process.shutdown().await;
    }

    info!("Goodbye");
    Ok(())
}
