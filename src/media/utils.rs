use serde_json::Value;

/// Rejects empty strings, non-http schemes and captcha placeholders some
/// endpoints hand back in place of a real address.
pub fn is_playable_addr(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return false;
    }
    if url.contains("verify") || url.contains("captcha") {
        return false;
    }
    true
}

/// Reads an address out of the shapes the various APIs use: a bare string,
/// a list of strings, or an object carrying `url_list` / `UrlList`.
pub fn address_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if is_playable_addr(s) => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(address_of),
        Value::Object(map) => ["url_list", "UrlList", "urlList", "url"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(address_of),
        _ => None,
    }
}

/// First address found under any of the JSON pointers, in order.
pub fn first_address(value: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .filter_map(|p| value.pointer(p))
        .find_map(address_of)
}

/// First non-empty string found under any of the JSON pointers, in order.
pub fn first_text(value: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .filter_map(|p| value.pointer(p))
        .filter_map(|v| v.as_str())
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(|s| s.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rendition {
    pub bit_rate: u64,
    pub address: String,
}

/// Collects the renditions listed under `pointer`, skipping entries without
/// a usable address.
pub fn renditions_at(value: &Value, pointer: &str) -> Vec<Rendition> {
    let Some(items) = value.pointer(pointer).and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let address = first_address(item, &["/play_addr", "/PlayAddr", "/playAddr"])?;
            let bit_rate = ["bit_rate", "bitrate", "Bitrate", "BitRate"]
                .iter()
                .filter_map(|key| item.get(*key))
                .find_map(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f as u64)))
                .unwrap_or(0);
            Some(Rendition { bit_rate, address })
        })
        .collect()
}

/// Highest bit rate wins; on a tie the earlier entry is kept.
pub fn pick_highest_bitrate(mut renditions: Vec<Rendition>) -> Option<String> {
    renditions.sort_by(|a, b| b.bit_rate.cmp(&a.bit_rate));
    renditions.into_iter().next().map(|r| r.address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_playable_addr() {
        assert!(is_playable_addr("https://cdn.example.com/v.mp4"));
        assert!(is_playable_addr("http://cdn.example.com/v.mp4"));
        assert!(!is_playable_addr(""));
        assert!(!is_playable_addr("/relative/v.mp4"));
        assert!(!is_playable_addr("https://www.tiktok.com/captcha/verify"));
    }

    #[test]
    fn test_address_of_shapes() {
        assert_eq!(
            address_of(&json!("https://a/1.mp4")),
            Some("https://a/1.mp4".to_string())
        );
        assert_eq!(
            address_of(&json!(["", "https://a/2.mp4"])),
            Some("https://a/2.mp4".to_string())
        );
        assert_eq!(
            address_of(&json!({"url_list": ["https://a/3.mp4"]})),
            Some("https://a/3.mp4".to_string())
        );
        assert_eq!(
            address_of(&json!({"UrlList": ["https://a/4.mp4"]})),
            Some("https://a/4.mp4".to_string())
        );
        assert_eq!(address_of(&json!(42)), None);
        assert_eq!(address_of(&json!({"uri": "v0f044"})), None);
    }

    #[test]
    fn test_first_text_skips_blank() {
        let value = json!({"title": "  ", "desc": "hello"});
        assert_eq!(
            first_text(&value, &["/title", "/desc"]),
            Some("hello".to_string())
        );
        assert_eq!(first_text(&value, &["/missing"]), None);
    }

    #[test]
    fn test_highest_bitrate_selected() {
        let value = json!({
            "bit_rate": [
                {"bit_rate": 500, "play_addr": {"url_list": ["https://cdn/500.mp4"]}},
                {"bit_rate": 1200, "play_addr": {"url_list": ["https://cdn/1200.mp4"]}},
                {"bit_rate": 900, "play_addr": {"url_list": ["https://cdn/900.mp4"]}}
            ]
        });
        let renditions = renditions_at(&value, "/bit_rate");
        assert_eq!(renditions.len(), 3);
        assert_eq!(
            pick_highest_bitrate(renditions),
            Some("https://cdn/1200.mp4".to_string())
        );
    }

    #[test]
    fn test_bitrate_tie_keeps_first() {
        let renditions = vec![
            Rendition {
                bit_rate: 800,
                address: "https://cdn/first.mp4".into(),
            },
            Rendition {
                bit_rate: 800,
                address: "https://cdn/second.mp4".into(),
            },
        ];
        assert_eq!(
            pick_highest_bitrate(renditions),
            Some("https://cdn/first.mp4".to_string())
        );
        assert_eq!(pick_highest_bitrate(Vec::new()), None);
    }

    #[test]
    fn test_renditions_skip_entries_without_address() {
        let value = json!({
            "bitrateInfo": [
                {"Bitrate": 3000, "PlayAddr": {"UrlList": []}},
                {"Bitrate": 1000, "PlayAddr": {"UrlList": ["https://cdn/1000.mp4"]}}
            ]
        });
        let renditions = renditions_at(&value, "/bitrateInfo");
        assert_eq!(
            renditions,
            vec![Rendition {
                bit_rate: 1000,
                address: "https://cdn/1000.mp4".into()
            }]
        );
    }
}
