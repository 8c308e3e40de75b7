use std::collections::HashSet;

use url::Url;

/// Splits pasted text into scrape targets: one URL per line, trimmed, blank
/// lines dropped, duplicates dropped in first-seen order.
pub fn parse_urls(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(normalize_url_for_dedupe(line)))
        .map(ToOwned::to_owned)
        .collect()
}

/// Key used to spot the same URL written two ways.
///
/// Parsable URLs lose their fragment and trailing slash and get a lowercased
/// scheme and host; anything else is just trimmed and lowercased.
pub fn normalize_url_for_dedupe(raw: &str) -> String {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_fragment(None);
            let mut normalized = url.to_string();
            while normalized.ends_with('/') {
                normalized.pop();
            }
            normalized
        }
        Err(_) => trimmed.trim_end_matches('/').to_lowercase(),
    }
}
