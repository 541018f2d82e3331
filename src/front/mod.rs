pub mod clipboard;
pub mod console;
pub mod session;

use crate::media::{
    validate_submission, Delivered, Delivery, MediaKind, MediaResolver, MediaResult, Validation,
};
use crate::utils::format_size;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Everything a front end needs to serve submissions.
pub struct Frontend {
    pub resolver: MediaResolver,
    pub download_client: reqwest::Client,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Warning(String),
    Error(String),
}

impl Notice {
    /// The single notice shown for a finished submission.
    pub fn for_result(result: &MediaResult) -> Self {
        match (&result.error, result.url.is_empty()) {
            (None, _) => Notice::Success("Video processed successfully!".to_string()),
            (Some(reason), false) => Notice::Warning(format!(
                "Note: {}. We'll show you the video but direct download may not work.",
                reason
            )),
            (Some(reason), true) => Notice::Error(format!(
                "{}. Please try again with a different TikTok URL or check if the URL is valid.",
                reason
            )),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }

    pub fn show(&self) {
        match self {
            Notice::Success(msg) => {
                info!("{}", msg);
                eprintln!("✅ {}", msg);
            }
            Notice::Warning(msg) => {
                warn!("{}", msg);
                eprintln!("⚠️  {}", msg);
            }
            Notice::Error(msg) => {
                error!("{}", msg);
                eprintln!("❌ {}", msg);
            }
        }
    }
}

/// Notice to show before submitting, if any. `Err` means there is nothing
/// to submit.
pub fn precheck(input: &str) -> std::result::Result<Option<Notice>, Notice> {
    match validate_submission(input) {
        Validation::Recognized => Ok(None),
        Validation::Empty => Err(Notice::Error("Please enter a TikTok URL".to_string())),
        Validation::Unrecognized => Ok(Some(Notice::Warning(
            "This doesn't look like a TikTok video link, trying anyway".to_string(),
        ))),
    }
}

/// Pulls http(s) links out of free text, in order.
pub fn extract_urls(content: &str) -> Vec<String> {
    content
        .split_whitespace()
        .filter_map(|word| {
            if word.starts_with("http://") || word.starts_with("https://") {
                Some(word.to_string())
            } else {
                None
            }
        })
        .collect()
}

/// Picks the link to submit from pasted text: the first recognised TikTok
/// link, if there is one.
pub fn link_from_paste(text: &str) -> Option<String> {
    extract_urls(text)
        .into_iter()
        .find(|url| validate_submission(url) == Validation::Recognized)
}

/// Turns a clipboard read into the link to submit. An unreadable clipboard
/// is only a warning; readable text without a TikTok link is an error.
pub fn link_from_clipboard(read: Result<String>) -> std::result::Result<String, Notice> {
    let text = read.map_err(|e| Notice::Warning(e.to_string()))?;
    link_from_paste(&text).ok_or_else(|| {
        Notice::Error("Clipboard does not contain a valid TikTok URL".to_string())
    })
}

/// Reads the clipboard and shows the matching notice. Returns the link on
/// success, otherwise the notice that was shown.
pub async fn paste() -> std::result::Result<String, Notice> {
    let outcome = link_from_clipboard(clipboard::read_text().await);
    match &outcome {
        Ok(_) => Notice::Success("TikTok URL pasted!".to_string()).show(),
        Err(notice) => notice.show(),
    }
    outcome
}

pub fn render_card(result: &MediaResult) -> String {
    if result.url.is_empty() {
        return String::new();
    }

    let kind = match result.media_kind {
        MediaKind::Video => "video",
        MediaKind::Image => "image",
    };
    let heading = if result.is_embed() {
        format!("Your {} can be viewed online", kind)
    } else {
        format!("Your {} is ready!", kind)
    };

    let mut card = format!("🎬 {}\n", heading);
    if !result.title.is_empty() {
        card.push_str(&format!("   title:  {}\n", result.title));
    }
    if !result.author.is_empty() {
        card.push_str(&format!("   author: {}\n", result.author));
    }
    if let Some(cover) = &result.cover {
        card.push_str(&format!("   cover:  {}\n", cover));
    }
    card.push_str(&format!("   url:    {}\n", result.url));

    let action = if result.is_embed() {
        "type 'open' to view it in your browser"
    } else {
        "type 'download' to save it"
    };
    card.push_str(&format!("   ({})", action));
    card
}

pub fn report_delivery(delivered: &Delivered) {
    match delivered {
        Delivered::Nothing => {
            Notice::Error("Nothing to download for this result".to_string()).show()
        }
        Delivered::Saved { path, bytes } => Notice::Success(format!(
            "Download saved to {} ({})",
            path.display(),
            format_size(*bytes)
        ))
        .show(),
        Delivered::Opened { url } => Notice::Success(format!("Opened {}", url)).show(),
    }
}

pub struct OnceOptions {
    pub json: bool,
    pub download: bool,
}

/// Resolves a single link and prints the outcome. Returns the notice shown.
pub async fn run_once(frontend: &Frontend, input: &str, opts: &OnceOptions) -> Result<Notice> {
    match precheck(input) {
        Ok(Some(warning)) => warning.show(),
        Ok(None) => {}
        Err(notice) => {
            notice.show();
            return Ok(notice);
        }
    }

    let result = frontend.resolver.resolve(input).await;
    let notice = Notice::for_result(&result);

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let card = render_card(&result);
        if !card.is_empty() {
            println!("{}", card);
        }
    }
    notice.show();

    if opts.download && !notice.is_error() {
        let delivered = Delivery::plan(&result)
            .execute(&frontend.download_client, &frontend.output_dir)
            .await?;
        report_delivery(&delivered);
    }

    Ok(notice)
}
