//! Core identifiers and the track model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

macro_rules! impl_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

impl_id!(
    /// Identifier of an independent community (the unit of session isolation)
    GuildId
);
impl_id!(
    /// Identifier of a text, voice or stage channel
    ChannelId
);
impl_id!(
    /// Identifier of a user
    UserId
);

impl ChannelId {
    /// Channel mention, rendered as the channel name by chat clients
    pub fn mention(&self) -> String {
        format!("<#{}>", self.0)
    }
}

/// A playable track resolved through the audio backend.
///
/// Immutable once resolved; owned exclusively by whichever queue slot holds
/// it and never shared between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Human-readable title
    pub title: String,
    /// Source URI or identifier understood by the backend
    pub uri: String,
    /// Duration, when the source reports one (live streams do not)
    pub duration: Option<Duration>,
}

impl Track {
    /// Create a track with no known duration
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
            duration: None,
        }
    }

    /// Create a track with a known duration
    pub fn with_duration(
        title: impl Into<String>,
        uri: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
            duration: Some(duration),
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}
