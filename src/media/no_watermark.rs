use super::{
    http::{read_json, with_credentials},
    provider::Provider,
    types::{FailureReason, MediaKind, MediaResult, ProviderInput, PLACEHOLDER_AUTHOR},
    utils::{first_address, first_text, pick_highest_bitrate, renditions_at},
};
use crate::config::ApiConfig;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

pub const NAME: &str = "no_watermark";

/// Metadata API keyed by video id that hands back watermark-free addresses.
pub struct NoWatermarkProvider {
    client: reqwest::Client,
    api: ApiConfig,
}

impl NoWatermarkProvider {
    pub fn new(client: reqwest::Client, api: ApiConfig) -> Self {
        Self { client, api }
    }

    fn request_url(&self, video_id: &str) -> Result<url::Url, FailureReason> {
        url::Url::parse_with_params(&self.api.endpoint, &[("video_id", video_id)])
            .map_err(|e| FailureReason::Transport(format!("invalid endpoint: {e}")))
    }

    fn select_play_address(data: &Value) -> Option<String> {
        if let Some(addr) = first_address(data, &["/play", "/hdplay"]) {
            debug!("{}: found address via play field", NAME);
            return Some(addr);
        }

        if let Some(addr) = first_address(
            data,
            &[
                "/video/play_addr",
                "/video/playAddr",
                "/video/download_addr",
                "/video/downloadAddr",
            ],
        ) {
            debug!("{}: found address via nested video field", NAME);
            return Some(addr);
        }

        let renditions = ["/video/bit_rate", "/video/bitrateInfo", "/video/bitrate_info"]
            .iter()
            .map(|p| renditions_at(data, p))
            .find(|r| !r.is_empty())?;
        debug!("{}: choosing among {} renditions", NAME, renditions.len());
        pick_highest_bitrate(renditions)
    }

    /// Maps the `{data: {...}}` payload onto a result.
    pub fn parse_payload(payload: &Value) -> Result<MediaResult, FailureReason> {
        let data = payload
            .get("data")
            .filter(|d| d.is_object())
            .ok_or(FailureReason::MalformedResponse)?;

        let (url, media_kind) = match first_address(data, &["/images"]) {
            Some(image) => (image, MediaKind::Image),
            None => (
                Self::select_play_address(data).ok_or(FailureReason::NoPlayableAddress)?,
                MediaKind::Video,
            ),
        };

        let author = match data.get("author") {
            Some(Value::String(name)) if !name.trim().is_empty() => name.trim().to_string(),
            _ => first_text(
                data,
                &["/author/nickname", "/author/unique_id", "/author/uniqueId"],
            )
            .unwrap_or_else(|| PLACEHOLDER_AUTHOR.to_string()),
        };

        Ok(MediaResult {
            url,
            media_kind,
            title: first_text(data, &["/title", "/desc"]).unwrap_or_default(),
            author,
            cover: first_address(
                data,
                &["/cover", "/origin_cover", "/video/cover", "/video/origin_cover"],
            ),
            error: None,
        })
    }
}

#[async_trait]
impl Provider for NoWatermarkProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn attempt(&self, input: &ProviderInput) -> Result<MediaResult, FailureReason> {
        let url = self.request_url(&input.video_id)?;
        info!("{}: requesting metadata for {}", NAME, input.video_id);

        let request = with_credentials(self.client.get(url), &self.api, NAME)?;
        let response = request.send().await?;
        let payload = read_json(response).await?;

        Self::parse_payload(&payload)
    }
}
