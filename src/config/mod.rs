use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_ENV: &str = "TOKGRAB_API_KEY";
pub const API_HOST_ENV: &str = "TOKGRAB_API_HOST";

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36";
const DEFAULT_DEMO_ASSET: &str =
    "https://storage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";
const DEFAULT_DEMO_COVER: &str =
    "https://storage.googleapis.com/gtv-videos-bucket/sample/images/BigBuckBunny.jpg";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub fallback: FallbackConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}

fn default_log_format() -> String {
    "pretty".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProvidersConfig {
    #[serde(default = "default_order")]
    pub order: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_no_watermark")]
    pub no_watermark: ApiConfig,
    #[serde(default = "default_downloader_api")]
    pub downloader_api: ApiConfig,
    #[serde(default = "default_web_page_base")]
    pub web_page_base: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            order: default_order(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            no_watermark: default_no_watermark(),
            downloader_api: default_downloader_api(),
            web_page_base: default_web_page_base(),
        }
    }
}

impl ProvidersConfig {
    /// Per-provider budget, kept within 1..=60 seconds.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.clamp(1, 60))
    }
}

fn default_order() -> Vec<String> {
    vec![
        "no_watermark".to_string(),
        "downloader_api".to_string(),
        "web_page".to_string(),
    ]
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_web_page_base() -> String {
    "https://www.tiktok.com".to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Endpoint plus the key/host header pair a hosted API expects.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiConfig {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_host: Option<String>,
    #[serde(default = "default_key_header")]
    pub key_header: String,
    #[serde(default = "default_host_header")]
    pub host_header: String,
}

impl ApiConfig {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            api_key: None,
            api_host: None,
            key_header: default_key_header(),
            host_header: default_host_header(),
        }
    }

    /// Key from the config file, else from the environment.
    pub fn resolved_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }

    /// Host from the config file, else the environment, else the endpoint's host.
    pub fn resolved_host(&self) -> Option<String> {
        self.api_host
            .clone()
            .filter(|h| !h.is_empty())
            .or_else(|| std::env::var(API_HOST_ENV).ok().filter(|h| !h.is_empty()))
            .or_else(|| {
                url::Url::parse(&self.endpoint)
                    .ok()
                    .and_then(|u| u.host_str().map(|h| h.to_string()))
            })
    }
}

fn default_key_header() -> String {
    "X-RapidAPI-Key".to_string()
}

fn default_host_header() -> String {
    "X-RapidAPI-Host".to_string()
}

fn default_no_watermark() -> ApiConfig {
    ApiConfig::new("https://tiktok-video-no-watermark2.p.rapidapi.com/")
}

fn default_downloader_api() -> ApiConfig {
    ApiConfig::new("https://tiktok-downloader-download-tiktok-videos-without-watermark.p.rapidapi.com/vid/index")
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    #[default]
    Embed,
    Demo,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FallbackConfig {
    #[serde(default)]
    pub mode: FallbackMode,
    #[serde(default = "default_demo_asset")]
    pub demo_asset: String,
    #[serde(default = "default_demo_cover")]
    pub demo_cover: Option<String>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            mode: FallbackMode::default(),
            demo_asset: default_demo_asset(),
            demo_cover: default_demo_cover(),
        }
    }
}

fn default_demo_asset() -> String {
    DEFAULT_DEMO_ASSET.to_string()
}

fn default_demo_cover() -> Option<String> {
    Some(DEFAULT_DEMO_COVER.to_string())
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DownloadConfig {
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Longest pause between two reads of a media body.
    #[serde(default = "default_stall_timeout_secs")]
    pub stall_timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            stall_timeout_secs: default_stall_timeout_secs(),
        }
    }
}

fn default_stall_timeout_secs() -> u64 {
    30
}

impl DownloadConfig {
    pub fn stall_timeout(&self) -> Duration {
        Duration::from_secs(self.stall_timeout_secs.clamp(1, 600))
    }

    pub fn resolved_output_dir(&self) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            return expand_home(dir);
        }

        dirs::download_dir()
            .map(|p| p.join("tokgrab"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        Self::from_toml(&raw).with_context(|| format!("Failed to parse config file {}", path))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Config = toml::from_str(raw)?;
        Ok(config)
    }

    pub fn get_logging_format(&self) -> &str {
        &self.logging.format
    }
}
