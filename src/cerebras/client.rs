use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, ErrorBody, Message};
use crate::config::ApiKey;
use crate::http::snippet;
use crate::research::types::SynthesisRequest;

const API_BASE: &str = "https://api.cerebras.ai/v1";

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("completion rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("completion API rejected the key: {0}")]
    Unauthorized(String),

    #[error("completion API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("model returned an empty completion")]
    EmptyCompletion,

    #[error("malformed completion response: {0}")]
    Malformed(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Single-shot chat completion.
/// Implemented by `CerebrasClient` for production; mock implementations used in tests.
pub trait SynthesisProvider {
    async fn complete(&self, request: &SynthesisRequest) -> Result<String, SynthesisError>;
}

#[derive(Clone)]
pub struct CerebrasClient {
    http: Client,
    api_key: ApiKey,
    base_url: String,
    timeout: Duration,
}

impl CerebrasClient {
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

impl SynthesisProvider for CerebrasClient {
    async fn complete(&self, request: &SynthesisRequest) -> Result<String, SynthesisError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: &request.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &request.system_prompt,
                },
                Message {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        };

        debug_assert!(
            url.starts_with("https://") || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .header("User-Agent", crate::USER_AGENT)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let classified = classify_status(status, &text);
            warn!(status = %status, error = %classified, "Cerebras completion failed");
            return Err(classified);
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| SynthesisError::Malformed(e.to_string()))?;

        if let Some(err) = body.error {
            let classified = classify_error_object(err);
            warn!(error = %classified, "Cerebras API error in 200 response");
            return Err(classified);
        }

        let choice = body.choices.and_then(|c| c.into_iter().next());
        if let Some(reason) = choice.as_ref().and_then(|c| c.finish_reason.as_deref()) {
            debug!(model = %request.model, finish_reason = reason, "completion finished");
        }

        choice
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(SynthesisError::EmptyCompletion)
    }
}

fn classify_status(status: StatusCode, body: &str) -> SynthesisError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| format!("HTTP {status}: {}", snippet(body)));

    match status {
        StatusCode::TOO_MANY_REQUESTS => SynthesisError::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SynthesisError::Unauthorized(message),
        _ => SynthesisError::Api {
            code: status.as_u16(),
            message,
        },
    }
}

/// An `error` object delivered with HTTP 200, classified by its `code`/`type`.
fn classify_error_object(err: ApiError) -> SynthesisError {
    let tags = err.tags();
    let message = err
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| "Unknown error".to_string());

    if tags.contains("rate_limit") || tags.contains("too_many_requests") || tags.contains("429") {
        SynthesisError::RateLimited
    } else if tags.contains("api_key")
        || tags.contains("auth")
        || tags.contains("permission")
        || tags.contains("401")
        || tags.contains("403")
    {
        SynthesisError::Unauthorized(message)
    } else {
        SynthesisError::Api { code: 200, message }
    }
}
