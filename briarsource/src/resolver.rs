//! Track source resolution
//!
//! Classifies a raw user query into a [`LoadRequest`] and resolves it into
//! a single playable [`Track`] through the backend.
//!
//! Classification rules, in order:
//!
//! 1. A well-formed absolute URL (scheme + host) is loaded directly.
//! 2. A two-letter source tag followed by `:` (e.g. `sc:`) becomes a
//!    source-scoped search with the tag stripped.
//! 3. Anything else becomes a default-source search on the full string.

use crate::backend::{AudioBackend, LoadRequest, LoadResult};
use crate::error::{Error, Result};
use crate::model::Track;
use std::sync::Arc;
use url::Url;

/// Classify a raw query into a load request.
///
/// The host check keeps scheme-only strings like `sc:foo` out of the direct
/// branch so explicit source tags are honored.
pub fn classify(query: &str) -> LoadRequest {
    let query = query.trim();

    if let Ok(url) = Url::parse(query) {
        if url.has_host() {
            return LoadRequest::DirectUrl(query.to_string());
        }
    }

    if let Some((tag, rest)) = query.split_once(':') {
        if tag.len() == 2 && tag.chars().all(|c| c.is_ascii_alphabetic()) {
            return LoadRequest::SourceSearch {
                source: tag.to_ascii_lowercase(),
                terms: rest.trim().to_string(),
            };
        }
    }

    LoadRequest::DefaultSearch(query.to_string())
}

/// Resolves queries into tracks via the backend's load primitive.
///
/// Picks the first returned candidate and discards the rest; an `Empty` or
/// `Error` load result surfaces as [`Error::NoResults`] so callers produce
/// a "no results" outcome without mutating any session state.
#[derive(Clone)]
pub struct TrackResolver {
    backend: Arc<dyn AudioBackend>,
}

impl TrackResolver {
    /// Create a resolver delegating to the given backend
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self { backend }
    }

    /// The backend this resolver loads through
    pub fn backend(&self) -> &Arc<dyn AudioBackend> {
        &self.backend
    }

    /// Resolve a raw query into the best-matching track
    pub async fn resolve(&self, query: &str) -> Result<Track> {
        let request = classify(query);
        match self.backend.load(&request).await? {
            LoadResult::Empty => Err(Error::NoResults(query.to_string())),
            LoadResult::Error(reason) => Err(Error::LoadFailed(reason)),
            loaded => loaded
                .into_first()
                .ok_or_else(|| Error::NoResults(query.to_string())),
        }
    }
}
