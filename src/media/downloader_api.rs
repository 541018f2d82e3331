use super::{
    http::{read_json, with_credentials},
    provider::Provider,
    types::{FailureReason, MediaKind, MediaResult, ProviderInput, PLACEHOLDER_AUTHOR},
    utils::{first_address, first_text},
};
use crate::config::ApiConfig;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

pub const NAME: &str = "downloader_api";

/// Downloader API that takes the raw link in a JSON POST body.
pub struct DownloaderApiProvider {
    client: reqwest::Client,
    api: ApiConfig,
}

impl DownloaderApiProvider {
    pub fn new(client: reqwest::Client, api: ApiConfig) -> Self {
        Self { client, api }
    }

    /// Maps the `{result: {...}}` payload onto a result.
    pub fn parse_payload(payload: &Value) -> Result<MediaResult, FailureReason> {
        let result = payload
            .get("result")
            .filter(|r| r.is_object())
            .ok_or(FailureReason::MalformedResponse)?;

        let (url, media_kind) = match first_address(result, &["/video"]) {
            Some(video) => (video, MediaKind::Video),
            None => (
                first_address(result, &["/images"]).ok_or(FailureReason::NoPlayableAddress)?,
                MediaKind::Image,
            ),
        };

        let author = match result.get("author") {
            Some(Value::String(name)) if !name.trim().is_empty() => name.trim().to_string(),
            _ => first_text(result, &["/author/nickname", "/author/unique_id"])
                .unwrap_or_else(|| PLACEHOLDER_AUTHOR.to_string()),
        };

        Ok(MediaResult {
            url,
            media_kind,
            title: first_text(result, &["/title", "/desc", "/description"]).unwrap_or_default(),
            author,
            cover: first_address(result, &["/cover", "/dynamic_cover"]),
            error: None,
        })
    }
}

#[async_trait]
impl Provider for DownloaderApiProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn attempt(&self, input: &ProviderInput) -> Result<MediaResult, FailureReason> {
        info!("{}: posting {}", NAME, input.url);

        let request = self
            .client
            .post(self.api.endpoint.as_str())
            .json(&json!({ "url": input.url }));
        let response = with_credentials(request, &self.api, NAME)?.send().await?;
        let payload = read_json(response).await?;

        Self::parse_payload(&payload)
    }
}
