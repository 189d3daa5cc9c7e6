use tracing::warn;

use super::client::SearchError;
use super::types::ExaSearchResponse;
use crate::research::types::{Round, SearchResult};

const UNTITLED: &str = "Untitled";

/// Maps an Exa response to ranked results. Entries without a URL are skipped;
/// a body with no `results` array is malformed.
pub fn extract_search_results(response: ExaSearchResponse) -> Result<Vec<SearchResult>, SearchError> {
    let Some(results) = response.results else {
        return Err(SearchError::Malformed("missing results array".to_string()));
    };

    let total = results.len();
    let extracted: Vec<SearchResult> = results
        .into_iter()
        .filter_map(|row| {
            let url = row.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())?;
            let title = row
                .title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED.to_string());
            let highlights = row.highlights.unwrap_or_default();
            let content = row
                .text
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| highlights.join(" "));
            Some(SearchResult {
                title,
                url,
                content,
                score: row.score,
                highlights,
                round: Round::First,
            })
        })
        .collect();

    if extracted.len() < total {
        warn!(
            skipped = total - extracted.len(),
            "dropped search results without a URL"
        );
    }

    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exa::types::ExaResult;

    fn row(url: Option<&str>, title: Option<&str>, text: Option<&str>) -> ExaResult {
        ExaResult {
            title: title.map(String::from),
            url: url.map(String::from),
            text: text.map(String::from),
            highlights: None,
            score: Some(0.5),
        }
    }

    #[test]
    fn extracts_in_ranking_order() {
        let response = ExaSearchResponse {
            results: Some(vec![
                row(Some("https://a.com"), Some("A"), Some("alpha")),
                row(Some("https://b.com"), Some("B"), Some("beta")),
            ]),
        };

        let results = extract_search_results(response).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url, "https://a.com");
        assert_eq!(results[0].content, "alpha");
        assert_eq!(results[0].score, Some(0.5));
        assert_eq!(results[1].title, "B");
    }

    #[test]
    fn missing_results_is_malformed() {
        let err = extract_search_results(ExaSearchResponse { results: None }).unwrap_err();
        assert!(matches!(err, SearchError::Malformed(_)));
    }

    #[test]
    fn empty_results_is_ok() {
        let results = extract_search_results(ExaSearchResponse {
            results: Some(vec![]),
        })
        .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn skips_rows_without_url() {
        let response = ExaSearchResponse {
            results: Some(vec![
                row(None, Some("No URL"), Some("x")),
                row(Some("  "), Some("Blank URL"), Some("x")),
                row(Some("https://valid.com"), Some("Valid"), Some("x")),
            ]),
        };

        let results = extract_search_results(response).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://valid.com");
    }

    #[test]
    fn missing_title_becomes_untitled() {
        let response = ExaSearchResponse {
            results: Some(vec![row(Some("https://a.com"), None, Some("x"))]),
        };
        let results = extract_search_results(response).unwrap();
        assert_eq!(results[0].title, "Untitled");
    }

    #[test]
    fn falls_back_to_highlights_when_text_missing() {
        let mut r = row(Some("https://a.com"), Some("A"), None);
        r.highlights = Some(vec!["first point".into(), "second point".into()]);
        let results = extract_search_results(ExaSearchResponse {
            results: Some(vec![r]),
        })
        .unwrap();

        assert_eq!(results[0].content, "first point second point");
        assert_eq!(results[0].highlights.len(), 2);
    }
}
