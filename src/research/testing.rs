//! Recording test doubles for the two provider traits.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::types::{SearchResult, SynthesisRequest};
use crate::cerebras::{SynthesisError, SynthesisProvider};
use crate::exa::{SearchError, SearchProvider};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchCall {
    pub query: String,
    pub max_results: usize,
    pub use_autoprompt: bool,
}

pub struct MockSearch {
    responses: Mutex<VecDeque<Result<Vec<SearchResult>, SearchError>>>,
    calls: Mutex<Vec<SearchCall>>,
}

impl MockSearch {
    pub fn new(responses: Vec<Result<Vec<SearchResult>, SearchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl SearchProvider for MockSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        use_autoprompt: bool,
    ) -> Result<Vec<SearchResult>, SearchError> {
        self.calls.lock().unwrap().push(SearchCall {
            query: query.to_string(),
            max_results,
            use_autoprompt,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Vec::new()))
    }
}

pub struct MockSynthesis {
    responses: Mutex<VecDeque<Result<String, SynthesisError>>>,
    requests: Mutex<Vec<SynthesisRequest>>,
}

impl MockSynthesis {
    pub fn new(responses: Vec<Result<String, SynthesisError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl SynthesisProvider for MockSynthesis {
    async fn complete(&self, request: &SynthesisRequest) -> Result<String, SynthesisError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(SynthesisError::EmptyCompletion))
    }
}
