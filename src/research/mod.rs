//! Research orchestration: one- and two-round search + synthesis flows.

pub(crate) mod orchestrator;
mod parse;
mod prompt;
pub(crate) mod sources;
#[cfg(test)]
pub(crate) mod testing;
pub(crate) mod types;

use crate::cerebras::SynthesisError;
use crate::exa::SearchError;

pub use orchestrator::Orchestrator;
pub use types::{Mode, ResearchResult};

#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error("synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("research cancelled")]
    Cancelled,
}
