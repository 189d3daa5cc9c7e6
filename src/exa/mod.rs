//! Web search through the Exa neural search API.

mod client;
mod results;
mod types;

pub use client::{ExaClient, SearchError, SearchProvider};
