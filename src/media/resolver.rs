use regex::Regex;
use std::sync::LazyLock;

const EMBED_PREFIX: &str = "https://www.tiktok.com/embed/";

static PROFILE_VIDEO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)tiktok\.com/@[\w.-]+/video/([0-9]+)").unwrap());
static SHORT_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bv[mt]\.tiktok\.com/([A-Za-z0-9_]+)").unwrap());
static T_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)tiktok\.com/t/([A-Za-z0-9_]+)").unwrap());
static MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bm\.tiktok\.com/v/([0-9]+)").unwrap());
static GENERIC_VIDEO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/video/([0-9]+)").unwrap());
static VIDEO_ID_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)video_id=([0-9]+)").unwrap());

/// Every recognised link shape, most specific first. The first four are
/// the ones a submission is expected to look like.
fn id_patterns() -> [&'static Regex; 6] {
    [
        &*PROFILE_VIDEO_RE,
        &*SHORT_LINK_RE,
        &*T_LINK_RE,
        &*MOBILE_RE,
        &*GENERIC_VIDEO_RE,
        &*VIDEO_ID_PARAM_RE,
    ]
}

const SUBMISSION_SHAPES: usize = 4;

/// Pulls the video identifier out of a TikTok link.
///
/// Short links (`vm.`/`vt.`/`/t/`) yield their opaque token since the
/// redirect is never followed here.
pub fn extract_video_id(url: &str) -> Option<String> {
    id_patterns()
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Recognized,
    Empty,
    Unrecognized,
}

/// Advisory check used to warn before submitting. Unrecognized input may
/// still be submitted.
pub fn validate_submission(input: &str) -> Validation {
    let input = input.trim();
    if input.is_empty() {
        return Validation::Empty;
    }

    if id_patterns()[..SUBMISSION_SHAPES]
        .iter()
        .any(|re| re.is_match(input))
    {
        Validation::Recognized
    } else {
        Validation::Unrecognized
    }
}

pub fn embed_url(video_id: &str) -> String {
    format!("{}v2/{}", EMBED_PREFIX, video_id)
}

pub fn is_embed_url(url: &str) -> bool {
    url.get(..EMBED_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(EMBED_PREFIX))
}

pub fn is_numeric_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_digit())
}
