//! REST client for the external audio node
//!
//! The node owns the voice transport and the audio pipeline; this client
//! only drives its session REST API. One [`LavaNode`] serves every guild:
//! players are addressed as `/v4/sessions/{session}/players/{guild}`.
//!
//! # Example
//!
//! ```no_run
//! use briarlink::LavaNode;
//! use briarsource::{AudioBackend, ChannelId, GuildId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let node = LavaNode::builder()
//!         .base_url("http://127.0.0.1:2333")
//!         .password("youshallnotpass")
//!         .build()?;
//!
//!     node.join_channel(GuildId(1), ChannelId(42)).await?;
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use crate::models::{ApiErrorBody, LoadResponse, Player};
use async_trait::async_trait;
use briarsource::{ChannelId, GuildId, LoadRequest, LoadResult, Track};
use reqwest::{Client, Method, StatusCode};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// Default node base URL
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:2333";

/// Default timeout for node REST requests (10 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default node session identifier
pub const DEFAULT_SESSION_ID: &str = "briarbot";

/// Default search source used for unprefixed queries
pub const DEFAULT_SEARCH_SOURCE: &str = "ytsearch";

/// Audio node REST client
///
/// Stateless apart from the shared HTTP connection pool; per-guild playback
/// state lives on the node and in the session layer, never here.
#[derive(Debug, Clone)]
pub struct LavaNode {
    client: Client,
    base_url: String,
    password: String,
    session_id: String,
    default_search: String,
    timeout: Duration,
}

impl LavaNode {
    /// Create a builder for configuring the client
    pub fn builder() -> LavaNodeBuilder {
        LavaNodeBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Host and port of the node, for reachability probing
    pub fn socket_addr(&self) -> Result<(String, u16)> {
        let url = Url::parse(&self.base_url)?;
        let host = url
            .host_str()
            .ok_or(url::ParseError::EmptyHost)?
            .to_string();
        let port = url.port_or_known_default().unwrap_or(2333);
        Ok((host, port))
    }

    // ========================================================================
    // REST surface
    // ========================================================================

    /// Load candidates for a node identifier string
    pub async fn load_tracks(&self, identifier: &str) -> Result<LoadResponse> {
        let mut url = Url::parse(&format!("{}/v4/loadtracks", self.base_url))?;
        url.query_pairs_mut().append_pair("identifier", identifier);

        debug!(identifier, "Loading tracks from node");

        let response = self
            .client
            .get(url)
            .header("Authorization", &self.password)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.api_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Node identifier string for a classified load request.
    ///
    /// Explicit source tags expand to `{tag}search:` (so `sc:` becomes
    /// `scsearch:`); unprefixed queries use the configured default source.
    pub fn identifier_for(&self, request: &LoadRequest) -> String {
        match request {
            LoadRequest::DirectUrl(url) => url.clone(),
            LoadRequest::SourceSearch { source, terms } => {
                format!("{source}search:{terms}")
            }
            LoadRequest::DefaultSearch(terms) => format!("{}:{terms}", self.default_search),
        }
    }

    /// Node version string, used as a readiness probe
    pub async fn version(&self) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/version", self.base_url))
            .header("Authorization", &self.password)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.api_error(response).await);
        }

        Ok(response.text().await?)
    }

    /// Partially update a guild's player resource
    async fn update_player(&self, guild: GuildId, body: serde_json::Value) -> Result<()> {
        trace!(guild = %guild, %body, "Updating player");
        let response = self
            .client
            .request(Method::PATCH, self.player_url(guild))
            .header("Authorization", &self.password)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.api_error(response).await);
        }
        Ok(())
    }

    /// Destroy a guild's player resource
    async fn destroy_player(&self, guild: GuildId) -> Result<()> {
        let response = self
            .client
            .delete(self.player_url(guild))
            .header("Authorization", &self.password)
            .timeout(self.timeout)
            .send()
            .await?;

        // Destroying an already-gone player is fine
        if !response.status().is_success() && response.status() != StatusCode::NOT_FOUND {
            return Err(self.api_error(response).await);
        }
        Ok(())
    }

    /// Fetch a guild's player resource, `None` when it does not exist
    async fn get_player(&self, guild: GuildId) -> Result<Option<Player>> {
        let response = self
            .client
            .get(self.player_url(guild))
            .header("Authorization", &self.password)
            .timeout(self.timeout)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(self.api_error(response).await);
        }
        Ok(Some(response.json().await?))
    }

    fn player_url(&self, guild: GuildId) -> String {
        format!(
            "{}/v4/sessions/{}/players/{}",
            self.base_url, self.session_id, guild
        )
    }

    async fn api_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.describe(),
            Err(_) => "unreadable error body".to_string(),
        };
        Error::Api { status, message }
    }
}

#[async_trait]
impl briarsource::AudioBackend for LavaNode {
    async fn join_channel(&self, guild: GuildId, channel: ChannelId) -> briarsource::Result<()> {
        self.update_player(guild, json!({"voice": {"channelId": channel.0}}))
            .await
            .map_err(Into::into)
    }

    async fn leave_channel(&self, guild: GuildId, _channel: ChannelId) -> briarsource::Result<()> {
        self.destroy_player(guild).await.map_err(Into::into)
    }

    async fn load(&self, request: &LoadRequest) -> briarsource::Result<LoadResult> {
        let identifier = self.identifier_for(request);
        let response = self.load_tracks(&identifier).await?;
        Ok(response.into_load_result())
    }

    async fn play(&self, guild: GuildId, track: &Track) -> briarsource::Result<()> {
        self.update_player(guild, json!({"track": {"identifier": track.uri}, "paused": false}))
            .await
            .map_err(Into::into)
    }

    async fn stop(&self, guild: GuildId, _track: &Track) -> briarsource::Result<()> {
        self.update_player(guild, json!({"track": {"encoded": null}}))
            .await
            .map_err(Into::into)
    }

    async fn pause(&self, guild: GuildId, _track: &Track) -> briarsource::Result<()> {
        self.update_player(guild, json!({"paused": true}))
            .await
            .map_err(Into::into)
    }

    async fn resume(&self, guild: GuildId, _track: &Track) -> briarsource::Result<()> {
        self.update_player(guild, json!({"paused": false}))
            .await
            .map_err(Into::into)
    }

    async fn is_connected(&self, guild: GuildId) -> bool {
        matches!(self.get_player(guild).await, Ok(Some(player)) if player.state.connected)
    }

    async fn become_speaker(&self, guild: GuildId, channel: ChannelId) -> briarsource::Result<()> {
        self.update_player(
            guild,
            json!({"stage": {"channelId": channel.0, "speaker": true}}),
        )
        .await
        .map_err(Into::into)
    }

    async fn request_to_speak(
        &self,
        guild: GuildId,
        channel: ChannelId,
    ) -> briarsource::Result<()> {
        self.update_player(
            guild,
            json!({"stage": {"channelId": channel.0, "requestToSpeak": true}}),
        )
        .await
        .map_err(Into::into)
    }
}

/// Builder for configuring a LavaNode client
#[derive(Debug)]
pub struct LavaNodeBuilder {
    client: Option<Client>,
    base_url: String,
    password: String,
    session_id: String,
    default_search: String,
    timeout: Duration,
}

impl Default for LavaNodeBuilder {
    fn default() -> Self {
        Self {
            client: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            password: String::new(),
            session_id: DEFAULT_SESSION_ID.to_string(),
            default_search: DEFAULT_SEARCH_SOURCE.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl LavaNodeBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the node base URL (trailing slash is stripped)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the node password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the node session identifier
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// Set the default search source for unprefixed queries
    pub fn default_search(mut self, source: impl Into<String>) -> Self {
        self.default_search = source.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<LavaNode> {
        // Reject unparseable URLs at build time rather than on first request
        Url::parse(&self.base_url)?;

        let client = match self.client {
            Some(client) => client,
            None => Client::builder().timeout(self.timeout).build()?,
        };

        Ok(LavaNode {
            client,
            base_url: self.base_url,
            password: self.password,
            session_id: self.session_id,
            default_search: self.default_search,
            timeout: self.timeout,
        })
    }
}
