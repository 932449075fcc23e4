//! Error types for the background monitors

/// Result type alias for monitor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while polling external health endpoints
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The endpoint could not be reached or decoded
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("API error (status {0})")]
    Api(u16),
}
