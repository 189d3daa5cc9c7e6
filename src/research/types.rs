use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Round {
    First,
    FollowUp,
}

impl Round {
    pub fn number(self) -> u8 {
        match self {
            Round::First => 1,
            Round::FollowUp => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Basic,
    Deep,
}

#[derive(Debug, Clone)]
pub struct ResearchQuery {
    pub text: String,
    pub round: Round,
}

/// A single retrieved document, in the order the search provider ranked it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<String>,
    pub round: Round,
}

#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchResult {
    pub original_query: String,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_query: Option<String>,
    pub source_count: usize,
    pub summary: String,
    pub insights: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth_gained: Option<String>,
    pub sources: Vec<SearchResult>,
    pub timestamp: DateTime<Utc>,
}

pub const NO_SOURCES_SUMMARY: &str = "No sources found for this query.";

impl ResearchResult {
    pub(crate) fn no_sources(query: &str, mode: Mode) -> Self {
        Self {
            original_query: query.to_string(),
            mode,
            follow_up_query: None,
            source_count: 0,
            summary: NO_SOURCES_SUMMARY.to_string(),
            insights: Vec::new(),
            depth_gained: None,
            sources: Vec::new(),
            timestamp: Utc::now(),
        }
    }
}
