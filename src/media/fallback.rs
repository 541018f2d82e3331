use super::{
    resolver::embed_url,
    types::{FailureReason, MediaKind, MediaResult, PLACEHOLDER_AUTHOR},
};
use crate::config::{FallbackConfig, FallbackMode};
use tracing::warn;

/// Builds the degraded result once every provider has failed.
pub trait FallbackBuilder: Send + Sync {
    fn build(&self, video_id: &str, reason: FailureReason) -> MediaResult;
}

pub fn placeholder_title(video_id: &str) -> String {
    format!("TikTok Video {}", video_id)
}

pub struct Fallback {
    mode: FallbackMode,
    demo_asset: String,
    demo_cover: Option<String>,
}

impl Fallback {
    pub fn from_config(config: &FallbackConfig) -> Self {
        Self {
            mode: config.mode,
            demo_asset: config.demo_asset.clone(),
            demo_cover: config.demo_cover.clone(),
        }
    }
}

impl FallbackBuilder for Fallback {
    fn build(&self, video_id: &str, reason: FailureReason) -> MediaResult {
        warn!(
            "All providers failed for {} ({}), using {:?} fallback",
            video_id, reason, self.mode
        );

        let (url, cover) = match self.mode {
            FallbackMode::Embed => (embed_url(video_id), None),
            FallbackMode::Demo => (self.demo_asset.clone(), self.demo_cover.clone()),
        };

        MediaResult {
            url,
            media_kind: MediaKind::Video,
            title: placeholder_title(video_id),
            author: PLACEHOLDER_AUTHOR.to_string(),
            cover,
            error: Some(reason),
        }
    }
}
