use super::types::{MediaKind, MediaResult};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

const MAX_TITLE_CHARS: usize = 30;
const DEFAULT_BASE_NAME: &str = "tiktok_video";

/// `<title>_<timestamp>.<ext>`, where the title keeps only ASCII letters and
/// digits and is cut to 30 characters.
pub fn suggested_filename(title: &str, kind: MediaKind, timestamp_ms: i64) -> String {
    let base: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_TITLE_CHARS)
        .collect();
    let base = if base.is_empty() {
        DEFAULT_BASE_NAME.to_string()
    } else {
        base
    };

    format!("{}_{}.{}", base, timestamp_ms, kind.extension())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Nothing,
    SaveFile { url: String, filename: String },
    OpenExternally { url: String },
}

#[derive(Debug)]
pub enum Delivered {
    Nothing,
    Saved { path: PathBuf, bytes: u64 },
    Opened { url: String },
}

impl Delivery {
    /// Embed pages can only be viewed, everything else with an address is saved.
    pub fn plan(result: &MediaResult) -> Self {
        Self::plan_at(result, chrono::Utc::now().timestamp_millis())
    }

    pub fn plan_at(result: &MediaResult, timestamp_ms: i64) -> Self {
        if result.url.is_empty() {
            return Delivery::Nothing;
        }

        if result.is_embed() {
            return Delivery::OpenExternally {
                url: result.url.clone(),
            };
        }

        Delivery::SaveFile {
            url: result.url.clone(),
            filename: suggested_filename(&result.title, result.media_kind, timestamp_ms),
        }
    }

    pub async fn execute(&self, client: &reqwest::Client, output_dir: &Path) -> Result<Delivered> {
        match self {
            Delivery::Nothing => Ok(Delivered::Nothing),
            Delivery::SaveFile { url, filename } => {
                let (path, bytes) = save_to_file(client, url, output_dir, filename).await?;
                Ok(Delivered::Saved { path, bytes })
            }
            Delivery::OpenExternally { url } => {
                open_externally(url).await?;
                Ok(Delivered::Opened { url: url.clone() })
            }
        }
    }
}

async fn save_to_file(
    client: &reqwest::Client,
    url: &str,
    output_dir: &Path,
    filename: &str,
) -> Result<(PathBuf, u64)> {
    info!("Downloading {} into {}", url, output_dir.display());

    let mut response = client
        .get(url)
        .send()
        .await
        .context("Failed to fetch media URL")?;

    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "Failed to download media: HTTP {}",
            response.status()
        ));
    }

    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    // Partial downloads stay in a temp file and never appear under the final name.
    let temp = NamedTempFile::new_in(output_dir).context("Failed to create temp file")?;
    let mut file = tokio::fs::File::from_std(temp.reopen().context("Failed to open temp file")?);

    let mut bytes: u64 = 0;
    while let Some(chunk) = response
        .chunk()
        .await
        .context("Failed to read media data")?
    {
        file.write_all(&chunk)
            .await
            .context("Failed to write media data")?;
        bytes += chunk.len() as u64;
    }
    file.flush().await.context("Failed to flush media file")?;
    drop(file);

    let target = output_dir.join(filename);
    temp.persist(&target)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to save {}", target.display()))?;

    debug!("Wrote {} bytes to {}", bytes, target.display());
    Ok((target, bytes))
}

async fn open_externally(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut c = tokio::process::Command::new("open");
        c.arg(url);
        c
    };

    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = tokio::process::Command::new("cmd");
        c.args(["/C", "start", "", url]);
        c
    };

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = {
        let mut c = tokio::process::Command::new("xdg-open");
        c.arg(url);
        c
    };

    let status = command
        .stdin(Stdio::null())
        .status()
        .await
        .context("Failed to launch the system opener")?;

    if !status.success() {
        return Err(anyhow::anyhow!("System opener exited with {}", status));
    }

    info!("Opened {} externally", url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DownloadConfig, ProvidersConfig};
    use crate::media::http::download_client_builder;
    use crate::media::test_support::{client, serve, serve_slow};
    use crate::media::types::FailureReason;
    use std::time::Duration;

    fn download_client(timeout_secs: u64, stall_timeout_secs: u64) -> reqwest::Client {
        let providers = ProvidersConfig {
            timeout_secs,
            ..ProvidersConfig::default()
        };
        let download = DownloadConfig {
            stall_timeout_secs,
            ..DownloadConfig::default()
        };
        download_client_builder(&providers, &download)
            .no_proxy()
            .build()
            .unwrap()
    }

    #[test]
    fn test_filename_sanitized() {
        let name = suggested_filename("Hello, World! 🎉", MediaKind::Video, 1700000000000);
        assert_eq!(name, "HelloWorld_1700000000000.mp4");

        let (base, _) = name.split_once("_1700000000000").unwrap();
        assert!(base
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }

    #[test]
    fn test_filename_truncated_and_defaulted() {
        let long = "a".repeat(80);
        let name = suggested_filename(&long, MediaKind::Image, 5);
        assert_eq!(name, format!("{}_5.jpg", "a".repeat(30)));

        assert_eq!(
            suggested_filename("🎉🎉 !!", MediaKind::Video, 7),
            "tiktok_video_7.mp4"
        );
        assert_eq!(suggested_filename("", MediaKind::Image, 7), "tiktok_video_7.jpg");
    }

    #[test]
    fn test_plan_by_url_shape() {
        assert_eq!(
            Delivery::plan_at(&MediaResult::failed(FailureReason::NoVideoId), 1),
            Delivery::Nothing
        );

        let embed = MediaResult {
            url: "https://www.tiktok.com/embed/v2/123".into(),
            error: Some(FailureReason::NoPlayableAddress),
            ..MediaResult::default()
        };
        assert_eq!(
            Delivery::plan_at(&embed, 1),
            Delivery::OpenExternally {
                url: "https://www.tiktok.com/embed/v2/123".into()
            }
        );

        let direct = MediaResult {
            url: "https://cdn/x.mp4".into(),
            title: "T".into(),
            ..MediaResult::default()
        };
        assert_eq!(
            Delivery::plan_at(&direct, 42),
            Delivery::SaveFile {
                url: "https://cdn/x.mp4".into(),
                filename: "T_42.mp4".into()
            }
        );
    }

    #[tokio::test]
    async fn test_save_file() {
        let server = serve(200, "video/mp4", "fake-mp4-bytes").await;
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");

        let delivery = Delivery::SaveFile {
            url: format!("{}/x.mp4", server.base_url),
            filename: "clip_1.mp4".into(),
        };
        let delivered = delivery.execute(&client(), &out).await.unwrap();

        match delivered {
            Delivered::Saved { path, bytes } => {
                assert_eq!(path, out.join("clip_1.mp4"));
                assert_eq!(bytes, 14);
                assert_eq!(std::fs::read_to_string(path).unwrap(), "fake-mp4-bytes");
            }
            other => panic!("unexpected delivery: {:?}", other),
        }
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_save_file_http_error() {
        let server = serve(404, "text/plain", "missing").await;
        let dir = tempfile::tempdir().unwrap();

        let delivery = Delivery::SaveFile {
            url: server.base_url.clone(),
            filename: "clip.mp4".into(),
        };
        assert!(delivery.execute(&client(), dir.path()).await.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_slow_body_outlasts_provider_timeout() {
        let server = serve_slow("0123456789", Duration::from_millis(1500), "abcdefghij").await;
        let dir = tempfile::tempdir().unwrap();

        let delivery = Delivery::SaveFile {
            url: format!("{}/slow.mp4", server.base_url),
            filename: "slow_1.mp4".into(),
        };
        let delivered = delivery
            .execute(&download_client(1, 30), dir.path())
            .await
            .unwrap();

        match delivered {
            Delivered::Saved { path, bytes } => {
                assert_eq!(bytes, 20);
                assert_eq!(
                    std::fs::read_to_string(path).unwrap(),
                    "0123456789abcdefghij"
                );
            }
            other => panic!("unexpected delivery: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stalled_body_fails_without_leftovers() {
        let server = serve_slow("0123456789", Duration::from_millis(2500), "abcdefghij").await;
        let dir = tempfile::tempdir().unwrap();

        let delivery = Delivery::SaveFile {
            url: format!("{}/stall.mp4", server.base_url),
            filename: "stall_1.mp4".into(),
        };
        assert!(delivery
            .execute(&download_client(10, 1), dir.path())
            .await
            .is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
