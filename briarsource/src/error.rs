//! Error types for audio source operations

/// Result type alias for source operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur at the audio backend boundary
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend rejected or failed a load request
    #[error("Track load failed: {0}")]
    LoadFailed(String),

    /// The backend returned no candidates for a query
    #[error("No results for query: {0}")]
    NoResults(String),

    /// The backend is unreachable or refused the operation
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend does not support the requested operation
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a load failure from any displayable cause
    pub fn load_failed(msg: impl Into<String>) -> Self {
        Self::LoadFailed(msg.into())
    }

    /// Create a backend-unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable(msg.into())
    }
}
