use super::{
    provider::Provider,
    resolver::is_numeric_id,
    types::{FailureReason, MediaKind, MediaResult, ProviderInput, PLACEHOLDER_AUTHOR},
    utils::{first_address, first_text, pick_highest_bitrate, renditions_at},
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

pub const NAME: &str = "web_page";

const REHYDRATION_OPEN: &str =
    "<script id=\"__UNIVERSAL_DATA_FOR_REHYDRATION__\" type=\"application/json\">";

/// Reads the media address straight out of the public video page.
pub struct WebPageProvider {
    client: reqwest::Client,
    base_url: String,
}

impl WebPageProvider {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Numeric ids go to the canonical page; short-link tokens are fetched
    /// through their original link so the redirect lands on the page.
    fn page_url(&self, input: &ProviderInput) -> String {
        if is_numeric_id(&input.video_id) {
            format!("{}/@i/video/{}", self.base_url, input.video_id)
        } else {
            input.url.clone()
        }
    }

    fn is_captcha_page(html: &str) -> bool {
        html.contains("verify-bar-close")
            || html.contains("captcha_verify")
            || html.contains("tiktok-verify-page")
            || (html.contains("Verify to continue") && !html.contains(REHYDRATION_OPEN))
    }

    pub fn parse_page(html: &str) -> Result<MediaResult, FailureReason> {
        if Self::is_captcha_page(html) {
            return Err(FailureReason::Blocked);
        }

        let json_str = html
            .split(REHYDRATION_OPEN)
            .nth(1)
            .and_then(|s| s.split("</script>").next())
            .ok_or(FailureReason::MalformedResponse)?;

        let data: Value =
            serde_json::from_str(json_str).map_err(|_| FailureReason::MalformedResponse)?;

        let video_detail = data
            .pointer("/__DEFAULT_SCOPE__/webapp.video-detail")
            .ok_or(FailureReason::MalformedResponse)?;

        if let Some(status_code) = video_detail.get("statusCode").and_then(|v| v.as_u64()) {
            if status_code != 0 {
                debug!("{}: statusCode={}", NAME, status_code);
                return Err(FailureReason::NoPlayableAddress);
            }
        }

        let detail = video_detail
            .pointer("/itemInfo/itemStruct")
            .ok_or(FailureReason::MalformedResponse)?;

        Self::parse_item(detail)
    }

    fn parse_item(detail: &Value) -> Result<MediaResult, FailureReason> {
        let image = first_address(detail, &["/imagePost/images/0/imageURL"]);
        let (url, media_kind) = match image {
            Some(image) => (image, MediaKind::Image),
            None => {
                let address = first_address(detail, &["/video/playAddr", "/video/downloadAddr"])
                    .or_else(|| pick_highest_bitrate(renditions_at(detail, "/video/bitrateInfo")))
                    .ok_or(FailureReason::NoPlayableAddress)?;
                (address, MediaKind::Video)
            }
        };

        Ok(MediaResult {
            url,
            media_kind,
            title: first_text(detail, &["/desc"]).unwrap_or_default(),
            author: first_text(detail, &["/author/nickname", "/author/uniqueId"])
                .unwrap_or_else(|| PLACEHOLDER_AUTHOR.to_string()),
            cover: first_address(detail, &["/video/cover", "/video/originCover"]),
            error: None,
        })
    }
}

#[async_trait]
impl Provider for WebPageProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn attempt(&self, input: &ProviderInput) -> Result<MediaResult, FailureReason> {
        let url = self.page_url(input);
        info!("{}: fetching {}", NAME, url);

        let response = self
            .client
            .get(&url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FailureReason::HttpStatus(status.as_u16()));
        }

        let html = response.text().await?;
        debug!("{}: HTML length {}", NAME, html.len());

        Self::parse_page(&html).inspect_err(|e| {
            if *e == FailureReason::Blocked {
                warn!("{}: captcha page served for {}", NAME, input.video_id);
            }
        })
    }
}
