//! LLM synthesis through the Cerebras chat completions API.

mod client;
mod types;

pub use client::{CerebrasClient, SynthesisError, SynthesisProvider};
