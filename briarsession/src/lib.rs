//! # briarsession
//!
//! Per-guild audio session orchestration: the session registry, the session
//! state record, and the lifecycle controller that is the single mutation
//! gate for everything a session owns.
//!
//! # Architecture
//!
//! - **SessionRegistry** : guild → session map; guarantees at most one live
//!   session per guild (check-and-insert under one write lock)
//! - **GuildSession** : connection state, current track, FIFO queue,
//!   vote-skip set, bound channels — all behind one per-guild async mutex
//! - **SessionController** : `join` / `leave` / `play` / `stop` / `skip` /
//!   `pause` / `resume` entry points returning user-facing
//!   [`CommandOutcome`]s, plus the channel-supplied entry points used by
//!   the live-stream bridge (`ensure_joined`, `play_now`, `disconnect`)
//!
//! Operations for different guilds run fully in parallel; operations for
//! the same guild serialize on the session mutex, which is held across
//! backend calls so that `join`+`join` or `skip`+`stop` can never interleave
//! into an inconsistent state.
//!
//! # Example
//!
//! ```no_run
//! use briarsession::SessionController;
//! use briarsource::{AudioBackend, ChannelId, GuildId};
//! use std::sync::Arc;
//!
//! # async fn example(backend: Arc<dyn AudioBackend>) {
//! let controller = SessionController::new(backend, 85);
//! let outcome = controller
//!     .play(GuildId(1), "sc:purple haze", Some(ChannelId(2)), ChannelId(3))
//!     .await;
//! println!("{}", outcome.message);
//! # }
//! ```

mod controller;
mod error;
mod registry;
mod session;

// Re-exports
pub use controller::{CommandOutcome, SessionController};
pub use error::{Error, Result};
pub use registry::SessionRegistry;
pub use session::{ConnectionState, GuildSession, SessionInner};
