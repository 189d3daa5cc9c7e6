use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<Message<'a>>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct Message<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Option<Vec<Choice>>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<AssistantMessage>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// A string like `"wrong_api_key"`, or occasionally an HTTP status number.
    pub code: Option<serde_json::Value>,
}

impl ApiError {
    /// `code` and `type` lowercased into one string for matching.
    pub fn tags(&self) -> String {
        let code = match &self.code {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        format!("{code} {}", self.kind.as_deref().unwrap_or_default()).to_ascii_lowercase()
    }
}

/// Cerebras reports errors either OpenAI-style (`{"error": {...}}`) or flat
/// (`{"message": ..., "type": ..., "code": ...}`).
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: Option<ApiError>,
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error
            .and_then(|e| e.message)
            .or(self.message)
            .filter(|m| !m.trim().is_empty())
    }
}
