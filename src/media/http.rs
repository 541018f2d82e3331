use super::types::FailureReason;
use crate::config::{ApiConfig, DownloadConfig, ProvidersConfig};
use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

pub fn build_client(config: &ProvidersConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .build()
        .context("Failed to create HTTP client")
}

/// Client for saving media. A body may take as long as it needs as long as
/// data keeps arriving, so there is no whole-request limit.
pub fn build_download_client(
    providers: &ProvidersConfig,
    download: &DownloadConfig,
) -> Result<reqwest::Client> {
    download_client_builder(providers, download)
        .build()
        .context("Failed to create download client")
}

pub(crate) fn download_client_builder(
    providers: &ProvidersConfig,
    download: &DownloadConfig,
) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(providers.user_agent.clone())
        .connect_timeout(providers.timeout())
        .read_timeout(download.stall_timeout())
}

/// Attaches the key/host header pair, or reports the provider as
/// unconfigured when there is no key.
pub fn with_credentials(
    request: reqwest::RequestBuilder,
    api: &ApiConfig,
    provider: &'static str,
) -> Result<reqwest::RequestBuilder, FailureReason> {
    let key = api
        .resolved_key()
        .ok_or(FailureReason::MissingCredentials(provider))?;

    let mut request = request.header(api.key_header.as_str(), key);
    if let Some(host) = api.resolved_host() {
        request = request.header(api.host_header.as_str(), host);
    }
    Ok(request)
}

/// Checks the status and decodes the body as JSON.
pub async fn read_json(response: reqwest::Response) -> Result<Value, FailureReason> {
    let status = response.status();
    if !status.is_success() {
        return Err(FailureReason::HttpStatus(status.as_u16()));
    }

    let body = response.text().await?;
    debug!("Provider response body: {} bytes", body.len());

    serde_json::from_str(&body).map_err(|_| FailureReason::MalformedResponse)
}
