use url::Url;

/// Normalize user input into an absolute http(s) URL.
///
/// Input without a scheme is treated as `https://`. The fragment is dropped so
/// that `a#x` and `a#y` export once. Returns `None` when the result is not a
/// usable http(s) URL.
pub fn normalize_article_url(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else if lower.contains("://") {
        return None;
    } else {
        format!("https://{trimmed}")
    };

    let mut url = Url::parse(&candidate).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    url.set_fragment(None);
    Some(url.into())
}
