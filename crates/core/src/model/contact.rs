//! Contact field parsing.
//!
//! The directory delivers phones and e-mails as one delimited string and the
//! website as free text. These helpers turn them into clean values.

use std::sync::LazyLock;

use regex::Regex;

static URL_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(https?://\S+|www\.\S+)").expect("url token pattern is valid"));

/// Split a delimited contact list on `,` or `;`, trimming entries and dropping empties.
pub fn split_contacts(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extract a usable website URL from free text.
///
/// Prefers the first `http(s)://` or `www.` token, then falls back to the
/// whole trimmed text. A missing scheme defaults to `https://`. Candidates
/// must parse as URLs with a dotted host.
pub fn normalize_website(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(token) = URL_TOKEN.find(trimmed)
        && let Some(url) = accept_url(token.as_str())
    {
        return Some(url);
    }

    accept_url(trimmed)
}

fn accept_url(candidate: &str) -> Option<String> {
    let with_scheme = if candidate.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("http")) {
        candidate.to_string()
    } else {
        format!("https://{candidate}")
    };

    let parsed = url::Url::parse(&with_scheme).ok()?;
    match parsed.scheme() {
        "http" | "https" => {}
        _ => return None,
    }

    let host = parsed.host_str()?;
    if !host.contains('.') || host.starts_with('.') || host.ends_with('.') {
        return None;
    }

    Some(with_scheme)
}
