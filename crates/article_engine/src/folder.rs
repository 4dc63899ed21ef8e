use std::fmt::Write;

use sha2::{Digest, Sha256};
use url::Url;

const MAX_URL_ID_CHARS: usize = 40;
const MAX_TITLE_CHARS: usize = 32;
const UNTITLED: &str = "untitled";

/// Folder name for one export: `{date}-{url_id}-{title}`.
///
/// `date` is expected as `YYYYMMDD`. The url id is the URL path with every
/// character outside `[A-Za-z0-9-]` removed, falling back to the host and then
/// to a short hash of the URL.
pub fn article_folder_name(date: &str, url: &str, title: &str) -> String {
    format!("{date}-{}-{}", url_id(url), safe_title(title))
}

fn url_id(url: &str) -> String {
    let keep = |raw: &str| -> String {
        raw.chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .take(MAX_URL_ID_CHARS)
            .collect()
    };
    let parsed = Url::parse(url).ok();
    let from_path = parsed
        .as_ref()
        .map(|u| keep(&u.path().trim_matches('/').replace('/', "-")))
        .filter(|id| !id.is_empty());
    let from_host = || {
        parsed
            .as_ref()
            .and_then(Url::host_str)
            .map(keep)
            .filter(|id| !id.is_empty())
    };
    from_path.or_else(from_host).unwrap_or_else(|| short_hash(url))
}

/// Title with path-hostile characters replaced, cut at a word boundary.
fn safe_title(title: &str) -> String {
    let mut cleaned = String::with_capacity(title.len());
    for c in title.trim().chars() {
        match c {
            '<' => cleaned.push('('),
            '>' => cleaned.push(')'),
            '|' | ':' | '\\' | '/' => cleaned.push('-'),
            '"' => cleaned.push('\''),
            '*' => cleaned.push('x'),
            '?' => {}
            c if c.is_whitespace() => cleaned.push(' '),
            c if c.is_control() => {}
            c => cleaned.push(c),
        }
    }
    let words: Vec<&str> = cleaned.split_whitespace().collect();

    let mut result = String::new();
    for word in &words {
        let extra = if result.is_empty() { 0 } else { 1 };
        if result.chars().count() + extra + word.chars().count() > MAX_TITLE_CHARS {
            break;
        }
        if extra == 1 {
            result.push(' ');
        }
        result.push_str(word);
    }
    if result.is_empty() {
        result = words.join(" ").chars().take(MAX_TITLE_CHARS).collect();
    }

    let result = result.trim_end_matches(['.', ' ']).to_string();
    if result.is_empty() {
        UNTITLED.to_string()
    } else if is_reserved_windows_name(&result) {
        format!("{result}_")
    } else {
        result
    }
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
