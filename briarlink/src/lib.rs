//! # briarlink
//!
//! REST client and process supervision for the external audio node that
//! owns voice transport and playback. This crate is the only implementation
//! of the [`briarsource::AudioBackend`] boundary trait; everything above it
//! is backend-agnostic.
//!
//! # Architecture
//!
//! - **LavaNode** : stateless REST client, one per node, shared by every
//!   guild; implements [`briarsource::AudioBackend`]
//! - **NodeProcess** : optional child-process supervision — spawn the node
//!   jar, forward its output into the log, wait for its TCP port, kill it
//!   on shutdown
//! - **models** : the node's JSON wire shapes (load responses, player
//!   state, error bodies)
//!
//! # Example
//!
//! ```no_run
//! use briarlink::{LavaNode, NodeProcess};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let node = LavaNode::builder()
//!         .base_url("http://127.0.0.1:2333")
//!         .password("youshallnotpass")
//!         .build()?;
//!
//!     let (host, port) = node.socket_addr()?;
//!     if !NodeProcess::probe(&host, port).await {
//!         let mut process = NodeProcess::spawn("java", "node.jar".as_ref())?;
//!         NodeProcess::wait_ready(&host, port, Duration::from_secs(30)).await?;
//!         // ... run, then:
//!         process.shutdown().await;
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod error;
pub mod models;
mod process;

// Re-exports
pub use client::{
    LavaNode, LavaNodeBuilder, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SEARCH_SOURCE, DEFAULT_SESSION_ID,
};
pub use error::{Error, Result};
pub use process::NodeProcess;
