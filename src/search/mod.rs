//! Web search, the collaborator the claim verifier queries for candidate sources.
//!
//! The verifier only depends on the [`SearchProvider`] trait. A DuckDuckGo
//! HTML implementation is included for real use and a scripted mock for tests.

mod duckduckgo;
pub mod mock;

pub use duckduckgo::DuckDuckGoSearch;
pub use mock::MockSearchProvider;

use async_trait::async_trait;

use crate::models::CandidateSource;

/// Turns a query into candidate sources (title, URL, snippet).
///
/// Implementations do not rank or mark trust; the verifier does that.
#[async_trait]
pub trait SearchProvider: Send + Sync + std::fmt::Debug {
    /// Run `query`, returning at most `max_results` hits
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<CandidateSource>, SearchError>;
}

/// Errors from a search provider
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not finish in time
    #[error("Search timed out")]
    Timeout,

    /// Non-success status from the search engine
    #[error("HTTP status {0}")]
    Http(u16),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimit,

    /// The response could not be understood
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return SearchError::Timeout;
        }
        SearchError::Network(err.to_string())
    }
}
