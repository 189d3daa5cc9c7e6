use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExaSearchRequest<'a> {
    pub query: &'a str,
    pub num_results: usize,
    pub use_autoprompt: bool,
    #[serde(rename = "type")]
    pub search_type: &'static str,
    pub contents: ContentsOptions,
}

#[derive(Debug, Serialize)]
pub struct ContentsOptions {
    pub text: bool,
    pub highlights: bool,
}

#[derive(Debug, Deserialize)]
pub struct ExaSearchResponse {
    pub results: Option<Vec<ExaResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExaResult {
    pub title: Option<String>,
    pub url: Option<String>,
    pub text: Option<String>,
    pub highlights: Option<Vec<String>>,
    pub score: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ExaErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ExaErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message).filter(|m| !m.trim().is_empty())
    }
}
