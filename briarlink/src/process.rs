//! Audio node process supervision
//!
//! Optionally spawns the node as a child process and waits for its TCP
//! port to accept connections before the rest of the system starts. When
//! the node is managed externally (systemd, docker), none of this runs and
//! the client connects to whatever is already listening.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Interval between readiness probes
const PROBE_INTERVAL: Duration = Duration::from_secs(1);

/// Timeout for a single TCP probe
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// A node child process owned by the orchestrator
pub struct NodeProcess {
    child: Child,
    jar_path: PathBuf,
}

impl NodeProcess {
    /// Whether something already listens on the node's port.
    ///
    /// Used to skip spawning when a node is running externally.
    pub async fn probe(host: &str, port: u16) -> bool {
        matches!(
            tokio::time::timeout(PROBE_TIMEOUT, TcpStream::connect((host, port))).await,
            Ok(Ok(_))
        )
    }

    /// Spawn the node jar as a child process.
    ///
    /// Stdout and stderr are forwarded line by line into the log so node
    /// output ends up in the same place as everything else.
    pub fn spawn(java_path: &str, jar_path: &Path) -> Result<Self> {
        info!(jar = %jar_path.display(), "Spawning audio node");

        let mut child = Command::new(java_path)
            .arg("-jar")
            .arg(jar_path)
            .current_dir(jar_path.parent().unwrap_or_else(|| Path::new(".")))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_output(stdout, "stdout"));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_output(stderr, "stderr"));
        }

        Ok(Self {
            child,
            jar_path: jar_path.to_path_buf(),
        })
    }

    /// Wait until the node accepts TCP connections, probing once a second
    pub async fn wait_ready(host: &str, port: u16, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if Self::probe(host, port).await {
                info!(host, port, "Audio node is ready");
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(Error::Timeout(format!(
                    "node did not open {host}:{port} within {}s",
                    timeout.as_secs()
                )));
            }
            debug!(host, port, "Node not ready yet");
            tokio::time::sleep(PROBE_INTERVAL).await;
        }
    }

    /// Path of the jar this process was spawned from
    pub fn jar_path(&self) -> &Path {
        &self.jar_path
    }

    /// Kill the child process and wait for it to exit
    pub async fn shutdown(&mut self) {
        info!("Stopping audio node");
        if let Err(e) = self.child.kill().await {
            warn!(error = %e, "Failed to kill node process");
        }
    }
}

async fn forward_output(
    stream: impl tokio::io::AsyncRead + Unpin,
    channel: &'static str,
) {
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(target: "briarlink::node", channel, "{line}");
    }
}
