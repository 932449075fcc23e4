//! Error types for session orchestration

use briarsource::GuildId;

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the bridge-facing session entry points.
///
/// Command-surface validation (missing voice channel, empty query,
/// duplicate vote, ...) never reaches this type: the controller turns
/// those into user-facing [`crate::CommandOutcome`] messages at the
/// boundary instead of propagating them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A session is already registered for this guild
    #[error("A session already exists for guild {0}")]
    AlreadyExists(GuildId),

    /// No session is registered for this guild
    #[error("No session for guild {0}")]
    NoSession(GuildId),

    /// The external audio backend failed an operation
    #[error("Audio backend error: {0}")]
    Backend(String),
}

impl From<briarsource::Error> for Error {
    fn from(err: briarsource::Error) -> Self {
        Error::Backend(err.to_string())
    }
}
