//! Icecast status endpoint client
//!
//! Icecast exposes its mount state as JSON at `/status-json.xsl`. The
//! `icestats.source` field is an object when one mount is live and an array
//! when several are; both shapes are accepted. A missing source or title
//! means nothing is broadcasting.

use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::trace;

/// Default timeout for status fetches (5 seconds, under the poll interval)
pub const DEFAULT_STATUS_TIMEOUT_SECS: u64 = 5;

/// Anything that can report the currently broadcast title.
///
/// The monitor only depends on this trait; [`IcecastClient`] is the
/// production implementation.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Raw title of the live source, `None` when nothing broadcasts.
    ///
    /// Errors mean the endpoint itself was unreachable or unreadable,
    /// which the monitor treats differently from a clean "no source".
    async fn current_title(&self) -> Result<Option<String>>;
}

/// HTTP client for one Icecast server
#[derive(Debug, Clone)]
pub struct IcecastClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl IcecastClient {
    /// Create a client for the given Icecast base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_STATUS_TIMEOUT_SECS),
        }
    }

    /// Use a custom HTTP client (shared connection pool)
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch and parse the full status document
    pub async fn fetch_status(&self) -> Result<StatusDocument> {
        let url = format!("{}/status-json.xsl", self.base_url);
        trace!(%url, "Fetching stream status");

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl StatusSource for IcecastClient {
    async fn current_title(&self) -> Result<Option<String>> {
        let status = self.fetch_status().await?;
        Ok(status.first_source_title())
    }
}

/// Top-level status document
#[derive(Debug, Deserialize)]
pub struct StatusDocument {
    pub icestats: IceStats,
}

impl StatusDocument {
    /// Title of the first live source, if any
    pub fn first_source_title(&self) -> Option<String> {
        self.icestats
            .source
            .as_ref()
            .and_then(SourceField::first)
            .and_then(|s| s.title.clone())
    }
}

/// `icestats` payload; `source` is absent when no mount is connected
#[derive(Debug, Deserialize)]
pub struct IceStats {
    #[serde(default)]
    pub source: Option<SourceField>,
}

/// One or several mounts, depending on how many are live
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SourceField {
    Many(Vec<Source>),
    One(Box<Source>),
}

impl SourceField {
    /// First mount in document order
    pub fn first(&self) -> Option<&Source> {
        match self {
            SourceField::Many(sources) => sources.first(),
            SourceField::One(source) => Some(source),
        }
    }
}

/// One Icecast mount
#[derive(Debug, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub listeners: Option<u64>,
    #[serde(default)]
    pub server_name: Option<String>,
}
