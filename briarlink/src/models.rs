//! Wire models for the audio node's REST API
//!
//! The node speaks JSON with camelCase field names. Only the fields the
//! orchestrator consumes are modeled; unknown fields are ignored on
//! deserialization.

use briarsource::{LoadResult, Track};
use serde::Deserialize;
use std::time::Duration;

/// Response of `GET /v4/loadtracks?identifier=...`
///
/// Adjacently tagged on `loadType`; the shape of `data` depends on the tag.
#[derive(Debug, Deserialize)]
#[serde(tag = "loadType", content = "data")]
pub enum LoadResponse {
    /// A single track resolved from a direct URL
    #[serde(rename = "track")]
    Track(LoadedTrack),

    /// A playlist; the orchestrator only ever takes the first entry
    #[serde(rename = "playlist")]
    Playlist(LoadedPlaylist),

    /// Search results, best match first
    #[serde(rename = "search")]
    Search(Vec<LoadedTrack>),

    /// Nothing matched the identifier
    #[serde(rename = "empty")]
    Empty(serde_json::Value),

    /// The node failed to load the identifier
    #[serde(rename = "error")]
    Error(LoadException),
}

impl LoadResponse {
    /// Flatten the node's answer into the orchestrator's load outcome
    pub fn into_load_result(self) -> LoadResult {
        match self {
            LoadResponse::Track(track) => LoadResult::Loaded(vec![track.into_track()]),
            LoadResponse::Playlist(playlist) => {
                if playlist.tracks.is_empty() {
                    LoadResult::Empty
                } else {
                    LoadResult::Loaded(
                        playlist
                            .tracks
                            .into_iter()
                            .map(LoadedTrack::into_track)
                            .collect(),
                    )
                }
            }
            LoadResponse::Search(tracks) => {
                if tracks.is_empty() {
                    LoadResult::Empty
                } else {
                    LoadResult::Loaded(
                        tracks.into_iter().map(LoadedTrack::into_track).collect(),
                    )
                }
            }
            LoadResponse::Empty(_) => LoadResult::Empty,
            LoadResponse::Error(e) => LoadResult::Error(e.message),
        }
    }
}

/// A track as returned by the node
#[derive(Debug, Clone, Deserialize)]
pub struct LoadedTrack {
    /// Opaque node-side track handle
    pub encoded: String,
    pub info: TrackInfo,
}

impl LoadedTrack {
    /// Convert into the orchestrator's track model.
    ///
    /// Live streams report no usable length, so duration is omitted for
    /// them. When the node has no URI for a track, the encoded handle is
    /// used as the playback identifier instead.
    pub fn into_track(self) -> Track {
        let uri = self.info.uri.unwrap_or(self.encoded);
        if self.info.is_stream {
            Track::new(self.info.title, uri)
        } else {
            Track::with_duration(
                self.info.title,
                uri,
                Duration::from_millis(self.info.length),
            )
        }
    }
}

/// Descriptive metadata of a loaded track
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    /// Track length in milliseconds; meaningless for live streams
    #[serde(default)]
    pub length: u64,
    #[serde(default)]
    pub is_stream: bool,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
}

/// Playlist payload of a `playlist` load response
#[derive(Debug, Deserialize)]
pub struct LoadedPlaylist {
    pub info: PlaylistInfo,
    pub tracks: Vec<LoadedTrack>,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistInfo {
    pub name: String,
}

/// Error payload of an `error` load response
#[derive(Debug, Deserialize)]
pub struct LoadException {
    pub message: String,
    #[serde(default)]
    pub severity: Option<String>,
}

/// Body of any non-success REST answer
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Best human-readable description available in the body
    pub fn describe(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

/// Player resource of `GET /v4/sessions/{session}/players/{guild}`
#[derive(Debug, Deserialize)]
pub struct Player {
    #[serde(default)]
    pub state: PlayerState,
}

/// Live connection state of a player
#[derive(Debug, Default, Deserialize)]
pub struct PlayerState {
    #[serde(default)]
    pub connected: bool,
}
