mod delivery;
mod demo;
mod downloader_api;
mod fallback;
mod http;
mod no_watermark;
mod provider;
mod resolver;
#[cfg(test)]
pub(crate) mod test_support;
mod types;
mod utils;
mod web_page;

pub use delivery::{Delivered, Delivery};
pub use http::{build_client, build_download_client};
pub use provider::Provider;
pub use resolver::{extract_video_id, validate_submission, Validation};
pub use types::{FailureReason, MediaKind, MediaResult, ProviderInput};

use crate::config::Config;
use demo::DemoProvider;
use downloader_api::DownloaderApiProvider;
use fallback::{Fallback, FallbackBuilder};
use no_watermark::NoWatermarkProvider;
use std::time::Duration;
use tracing::{debug, info, warn};
use web_page::WebPageProvider;

/// Runs the configured providers in order and degrades to the fallback
/// when none of them produce an address.
pub struct MediaResolver {
    providers: Vec<Box<dyn Provider>>,
    fallback: Box<dyn FallbackBuilder>,
    timeout: Duration,
}

impl MediaResolver {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        let mut providers: Vec<Box<dyn Provider>> = Vec::new();

        for name in &config.providers.order {
            let provider: Box<dyn Provider> = match name.as_str() {
                no_watermark::NAME => Box::new(NoWatermarkProvider::new(
                    client.clone(),
                    config.providers.no_watermark.clone(),
                )),
                downloader_api::NAME => Box::new(DownloaderApiProvider::new(
                    client.clone(),
                    config.providers.downloader_api.clone(),
                )),
                web_page::NAME => Box::new(WebPageProvider::new(
                    client.clone(),
                    &config.providers.web_page_base,
                )),
                demo::NAME => Box::new(DemoProvider::from_config(&config.fallback)),
                other => {
                    warn!("Unknown provider '{}' in config, skipping", other);
                    continue;
                }
            };
            providers.push(provider);
        }

        let resolver = Self::with_providers(
            providers,
            Box::new(Fallback::from_config(&config.fallback)),
            config.providers.timeout(),
        );
        info!(
            "Media resolver initialized with providers: {}",
            resolver.provider_names().join(", ")
        );
        resolver
    }

    pub fn with_providers(
        providers: Vec<Box<dyn Provider>>,
        fallback: Box<dyn FallbackBuilder>,
        timeout: Duration,
    ) -> Self {
        Self {
            providers,
            fallback,
            timeout,
        }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Never fails: every outcome, including total failure, is a result.
    pub async fn resolve(&self, url: &str) -> MediaResult {
        let result = self.resolve_inner(url).await;
        debug_assert!(result.is_consistent(), "inconsistent result: {:?}", result);
        result
    }

    async fn resolve_inner(&self, url: &str) -> MediaResult {
        info!("Resolving media for URL: {}", url);

        let Some(video_id) = extract_video_id(url) else {
            warn!("No video id found in {:?}", url);
            return MediaResult::failed(FailureReason::NoVideoId);
        };
        debug!("Extracted video id {}", video_id);

        let input = ProviderInput {
            video_id,
            url: url.trim().to_string(),
        };
        let mut last_failure = FailureReason::NoPlayableAddress;

        for provider in &self.providers {
            let outcome = match tokio::time::timeout(self.timeout, provider.attempt(&input)).await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(FailureReason::Timeout(self.timeout.as_secs())),
            };

            match outcome {
                Ok(result) => {
                    info!("Resolved {} with {}", input.video_id, provider.name());
                    return result;
                }
                Err(reason) => {
                    warn!("{} failed: {}", provider.name(), reason);
                    last_failure = reason;
                }
            }
        }

        self.fallback.build(&input.video_id, last_failure)
    }
}
