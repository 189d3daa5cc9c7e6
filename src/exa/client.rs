use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::results::extract_search_results;
use super::types::{ContentsOptions, ExaErrorBody, ExaSearchRequest, ExaSearchResponse};
use crate::config::ApiKey;
use crate::http::snippet;
use crate::research::types::SearchResult;

const API_BASE: &str = "https://api.exa.ai";

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("search quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("search API rejected the key: {0}")]
    Unauthorized(String),

    #[error("search API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("malformed search response: {0}")]
    Malformed(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Neural/keyword hybrid web search.
/// Implemented by `ExaClient` for production; mock implementations used in tests.
pub trait SearchProvider {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        use_autoprompt: bool,
    ) -> Result<Vec<SearchResult>, SearchError>;
}

#[derive(Clone)]
pub struct ExaClient {
    http: Client,
    api_key: ApiKey,
    base_url: String,
    timeout: Duration,
}

impl ExaClient {
    pub fn new(http: Client, api_key: ApiKey, timeout: Duration) -> Self {
        Self {
            http,
            api_key,
            base_url: API_BASE.to_string(),
            timeout,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey::new("test-key"),
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl SearchProvider for ExaClient {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        use_autoprompt: bool,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let url = format!("{}/search", self.base_url);
        let request = ExaSearchRequest {
            query,
            num_results: max_results,
            use_autoprompt,
            search_type: "auto",
            contents: ContentsOptions {
                text: true,
                highlights: true,
            },
        };

        debug_assert!(
            url.starts_with("https://") || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        let response = self
            .http
            .post(&url)
            .header("x-api-key", self.api_key.expose())
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let classified = classify_status(status, &text);
            warn!(status = %status, error = %classified, "Exa search failed");
            return Err(classified);
        }

        let body: ExaSearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Malformed(e.to_string()))?;
        let results = extract_search_results(body)?;
        debug!(results = results.len(), "exa search complete");
        Ok(results)
    }
}

fn classify_status(status: StatusCode, body: &str) -> SearchError {
    let message = serde_json::from_str::<ExaErrorBody>(body)
        .ok()
        .and_then(ExaErrorBody::into_message)
        .unwrap_or_else(|| format!("HTTP {status}: {}", snippet(body)));

    match status {
        StatusCode::TOO_MANY_REQUESTS => SearchError::RateLimited,
        StatusCode::UNAUTHORIZED => SearchError::Unauthorized(message),
        StatusCode::PAYMENT_REQUIRED | StatusCode::FORBIDDEN => SearchError::QuotaExhausted(message),
        _ => SearchError::Api {
            code: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_429_as_rate_limited() {
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, ""),
            SearchError::RateLimited
        ));
    }

    #[test]
    fn classify_401_uses_structured_message() {
        match classify_status(StatusCode::UNAUTHORIZED, r#"{"error":"Invalid API key"}"#) {
            SearchError::Unauthorized(message) => assert_eq!(message, "Invalid API key"),
            other => panic!("expected Unauthorized, got: {other:?}"),
        }
    }

    #[test]
    fn classify_402_as_quota_exhausted() {
        assert!(matches!(
            classify_status(StatusCode::PAYMENT_REQUIRED, "{}"),
            SearchError::QuotaExhausted(_)
        ));
    }

    #[test]
    fn classify_500_keeps_body_snippet() {
        let long = "e".repeat(500);
        match classify_status(StatusCode::INTERNAL_SERVER_ERROR, &long) {
            SearchError::Api { code, message } => {
                assert_eq!(code, 500);
                assert!(message.len() < 300, "snippet should be capped: {}", message.len());
            }
            other => panic!("expected Api error, got: {other:?}"),
        }
    }
}

#[cfg(test)]
mod http_tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn search_success_returns_ranked_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("x-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "query": "rust async",
                "numResults": 3,
                "useAutoprompt": true,
                "contents": { "text": true }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {
                        "title": "Async Book",
                        "url": "https://rust-lang.github.io/async-book/",
                        "text": "Asynchronous programming in Rust",
                        "score": 0.92
                    },
                    {
                        "title": "Tokio",
                        "url": "https://tokio.rs",
                        "text": "An asynchronous runtime",
                        "score": 0.88
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ExaClient::with_base_url(Client::new(), &server.uri());
        let results = client.search("rust async", 3, true).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Async Book");
        assert_eq!(results[1].url, "https://tokio.rs");
        assert_eq!(results[0].score, Some(0.92));
    }

    #[tokio::test]
    async fn search_401_returns_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(serde_json::json!({"error": "bad key"})),
            )
            .mount(&server)
            .await;

        let client = ExaClient::with_base_url(Client::new(), &server.uri());
        let err = client.search("test", 5, true).await.unwrap_err();
        assert!(matches!(err, SearchError::Unauthorized(ref m) if m == "bad key"));
    }

    #[tokio::test]
    async fn search_429_returns_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;

        let client = ExaClient::with_base_url(Client::new(), &server.uri());
        let err = client.search("test", 5, true).await.unwrap_err();
        assert!(matches!(err, SearchError::RateLimited));
    }

    #[tokio::test]
    async fn search_500_with_invalid_body_returns_generic_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let client = ExaClient::with_base_url(Client::new(), &server.uri());
        match client.search("test", 5, true).await {
            Err(SearchError::Api { code: 500, message }) => {
                assert!(message.contains("upstream exploded"), "got: {message}");
            }
            other => panic!("expected Api(500), got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn search_200_with_garbage_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = ExaClient::with_base_url(Client::new(), &server.uri());
        let err = client.search("test", 5, true).await.unwrap_err();
        assert!(matches!(err, SearchError::Malformed(_)));
    }

    #[tokio::test]
    async fn search_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"results": []}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let mut client = ExaClient::with_base_url(Client::new(), &server.uri());
        client.timeout = Duration::from_millis(100);
        let err = client.search("test", 5, true).await.unwrap_err();
        match err {
            SearchError::Network(e) => assert!(e.is_timeout(), "expected timeout, got: {e}"),
            other => panic!("expected Network timeout, got: {other:?}"),
        }
    }
}
