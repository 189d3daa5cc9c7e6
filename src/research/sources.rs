use std::collections::HashSet;

use url::Url;

use super::types::{Round, SearchResult};

/// Cuts `text` to at most `max_chars` characters (not bytes).
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Key used for URL deduplication: fragment dropped, scheme and host
/// normalized by the `url` crate. Unparsable URLs compare by trimmed text.
pub fn url_key(raw: &str) -> String {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => trimmed.to_string(),
    }
}

/// Accumulates sources across rounds, keeping ranking order and the first
/// occurrence of every URL.
#[derive(Debug, Default)]
pub struct SourceSet {
    seen: HashSet<String>,
    sources: Vec<SearchResult>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Truncates, filters and appends one round's results. Returns how many were added.
    pub fn ingest(
        &mut self,
        results: Vec<SearchResult>,
        round: Round,
        max_content_chars: usize,
        min_content_chars: usize,
    ) -> usize {
        let before = self.sources.len();
        for mut result in results {
            let truncated = truncate_chars(&result.content, max_content_chars);
            if truncated.len() < result.content.len() {
                result.content = truncated.to_string();
            }
            if result.content.chars().count() < min_content_chars {
                continue;
            }
            if !self.seen.insert(url_key(&result.url)) {
                continue;
            }
            result.round = round;
            self.sources.push(result);
        }
        self.sources.len() - before
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn as_slice(&self) -> &[SearchResult] {
        &self.sources
    }

    pub fn into_vec(self) -> Vec<SearchResult> {
        self.sources
    }
}

#[cfg(test)]
pub(crate) fn make_result(url: &str, title: &str, content: &str) -> SearchResult {
    SearchResult {
        title: title.into(),
        url: url.into(),
        content: content.into(),
        score: None,
        highlights: Vec::new(),
        round: Round::First,
    }
}
