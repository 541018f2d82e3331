use serde::{Serialize, Serializer};
use thiserror::Error;

use super::resolver::is_embed_url;

pub const PLACEHOLDER_AUTHOR: &str = "TikTok Creator";

/// Why a provider could not produce a direct media address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("could not extract video id")]
    NoVideoId,
    #[error("provider returned malformed response")]
    MalformedResponse,
    #[error("no playable address found")]
    NoPlayableAddress,
    #[error("provider returned HTTP {0}")]
    HttpStatus(u16),
    #[error("{0}")]
    Transport(String),
    #[error("provider timed out after {0}s")]
    Timeout(u64),
    #[error("{0} has no API credentials configured")]
    MissingCredentials(&'static str),
    #[error("provider blocked the request")]
    Blocked,
    #[error("demo asset substituted for unresolved media")]
    DemoMode,
}

impl From<reqwest::Error> for FailureReason {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return FailureReason::Transport(format!("request timed out: {err}"));
        }
        if err.is_decode() {
            return FailureReason::MalformedResponse;
        }
        match err.status() {
            Some(status) => FailureReason::HttpStatus(status.as_u16()),
            None => FailureReason::Transport(err.to_string()),
        }
    }
}

impl Serialize for FailureReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Video,
    Image,
}

impl MediaKind {
    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Video => "mp4",
            MediaKind::Image => "jpg",
        }
    }
}

/// The outcome of one submission. `error` is set whenever the result is
/// degraded; without it `url` is always a direct media address.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaResult {
    pub url: String,
    pub media_kind: MediaKind,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureReason>,
}

impl MediaResult {
    pub fn failed(reason: FailureReason) -> Self {
        Self {
            error: Some(reason),
            ..Self::default()
        }
    }

    pub fn is_embed(&self) -> bool {
        is_embed_url(&self.url)
    }

    /// Checks the result/error pairing the front end relies on.
    pub fn is_consistent(&self) -> bool {
        match self.error {
            None => !self.url.is_empty() && !self.is_embed(),
            Some(_) => true,
        }
    }
}

/// What a provider gets to work with. Some providers key on the id,
/// others on the raw link.
#[derive(Debug, Clone)]
pub struct ProviderInput {
    pub video_id: String,
    pub url: String,
}
