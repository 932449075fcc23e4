//! Error types for audio node operations

/// Result type alias for node operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to or supervising the audio node
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP transport failure (connection refused, timeout, bad TLS, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured node URL could not be parsed
    #[error("Invalid node URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The node answered with a non-success status
    #[error("Node API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Spawning or killing the node process failed
    #[error("Node process error: {0}")]
    Io(#[from] std::io::Error),

    /// The node did not become reachable within the allotted time
    #[error("Timed out waiting for node: {0}")]
    Timeout(String),
}

impl From<Error> for briarsource::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Api { status, message } => {
                briarsource::Error::load_failed(format!("status {status}: {message}"))
            }
            other => briarsource::Error::unavailable(other.to_string()),
        }
    }
}
