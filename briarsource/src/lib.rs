//! # briarsource
//!
//! Common traits and types for BriarBot audio delivery.
//!
//! This crate provides the foundational abstractions shared by the rest of
//! the workspace:
//!
//! - **Typed identifiers**: [`GuildId`], [`ChannelId`], [`UserId`]
//! - **Track model**: [`Track`] — immutable once resolved
//! - **Backend boundary**: the [`AudioBackend`] trait, the only seam through
//!   which the orchestrator talks to the external audio node
//! - **Notification boundary**: the [`Notifier`] trait for user-facing
//!   channel messages
//! - **Query classification**: [`TrackResolver`] turns raw user queries into
//!   load requests (direct URL, source-scoped search, default search)
//!
//! The orchestrator never names a concrete transport: everything network
//! related lives behind `AudioBackend`, implemented elsewhere (see the
//! `briarlink` crate for the REST node client).
//!
//! # Example
//!
//! ```no_run
//! use briarsource::{classify, LoadRequest};
//!
//! assert!(matches!(
//!     classify("https://example.com/stream"),
//!     LoadRequest::DirectUrl(_)
//! ));
//! assert!(matches!(
//!     classify("sc:purple haze"),
//!     LoadRequest::SourceSearch { .. }
//! ));
//! assert!(matches!(
//!     classify("purple haze"),
//!     LoadRequest::DefaultSearch(_)
//! ));
//! ```

pub mod backend;
pub mod error;
pub mod model;
pub mod notify;
pub mod resolver;

// Re-exports
pub use backend::{AudioBackend, LoadRequest, LoadResult};
pub use error::{Error, Result};
pub use model::{ChannelId, GuildId, Track, UserId};
pub use notify::Notifier;
pub use resolver::{classify, TrackResolver};
