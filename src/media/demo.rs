use super::{
    fallback::placeholder_title,
    provider::Provider,
    types::{FailureReason, MediaKind, MediaResult, ProviderInput, PLACEHOLDER_AUTHOR},
};
use crate::config::FallbackConfig;
use async_trait::async_trait;
use tracing::info;

pub const NAME: &str = "demo";

/// Offline strategy: always answers with the configured sample asset.
pub struct DemoProvider {
    asset: String,
    cover: Option<String>,
}

impl DemoProvider {
    pub fn from_config(config: &FallbackConfig) -> Self {
        Self {
            asset: config.demo_asset.clone(),
            cover: config.demo_cover.clone(),
        }
    }
}

#[async_trait]
impl Provider for DemoProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn attempt(&self, input: &ProviderInput) -> Result<MediaResult, FailureReason> {
        info!("{}: serving sample asset for {}", NAME, input.video_id);

        Ok(MediaResult {
            url: self.asset.clone(),
            media_kind: MediaKind::Video,
            title: placeholder_title(&input.video_id),
            author: PLACEHOLDER_AUTHOR.to_string(),
            cover: self.cover.clone(),
            error: Some(FailureReason::DemoMode),
        })
    }
}
