//! Error types for the live-stream bridge

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while polling or bridging a stream.
///
/// None of these are fatal: a failing poll cycle is logged (or mapped to an
/// offline observation) and the loop keeps running.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The status endpoint could not be fetched or decoded
    #[error("Status fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A session operation on behalf of the bridge failed
    #[error(transparent)]
    Session(#[from] briarsession::Error),

    /// The audio backend refused a bridge-side operation
    #[error(transparent)]
    Source(#[from] briarsource::Error),
}
