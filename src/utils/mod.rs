use url::Url;

const YOUTUBE_HOSTS: &[&str] = &[
    "youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtube-nocookie.com",
];

/// Resolve a video identifier from user input.
///
/// YouTube watch, short-link, embed, shorts and `/v/` URLs yield their video
/// ID. Anything else is returned unchanged; the provider validates it.
pub fn extract_video_id(input: &str) -> String {
    let trimmed = input.trim();

    extract_from_url(trimmed).unwrap_or_else(|| trimmed.to_string())
}

fn extract_from_url(input: &str) -> Option<String> {
    let parsed = Url::parse(input).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    let host = extract_domain(&parsed)?;
    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());

    let id = if host == "youtu.be" {
        segments.next().map(str::to_string)
    } else if YOUTUBE_HOSTS.contains(&host.as_str()) {
        match segments.next()? {
            "watch" => parsed
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            "embed" | "shorts" | "v" | "live" => segments.next().map(str::to_string),
            _ => None,
        }
    } else {
        None
    };

    id.filter(|id| !id.is_empty())
}

/// Host of a parsed URL without any `www.` prefix
fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|host| {
        host.strip_prefix("www.")
            .unwrap_or(host)
            .to_lowercase()
    })
}

/// Human-readable name of a language code for diagnostics
pub fn language_label(code: &str) -> String {
    let label = match code.to_lowercase().as_str() {
        "ko" => "Korean",
        "en" => "English",
        "ja" => "Japanese",
        "zh" | "zh-cn" | "zh-hans" => "Chinese",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        _ => code, // Unknown codes are shown as-is
    };

    label.to_string()
}
