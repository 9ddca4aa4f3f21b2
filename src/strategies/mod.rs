//! Acquisition strategies with a uniform trait-based contract.
//!
//! Every way of getting a page (a browser-fingerprinted HTTP client, a headless
//! browser, an archive mirror, ...) implements [`Strategy`]. The
//! [`StrategyChain`] owns an ordered list of them and tries each in turn until
//! one yields content that clears extraction and block detection.
//!
//! # Default order
//!
//! 1. `bypass` - browser-fingerprinted HTTP client (cheapest)
//! 2. `browser` - stealth headless Chromium
//! 3. `archive` - Wayback Machine mirror
//! 4. `reader` - reader proxy that returns rendered prose
//! 5. `direct` - plain GET with browser-like headers
//! 6. `cache` - search engine cache mirror (last resort)
//!
//! # Runtime Strategy Configuration
//!
//! - `ARTICLE_SCOUT_ENABLED_STRATEGIES` - Only use these strategies (e.g., "bypass,direct")
//! - `ARTICLE_SCOUT_DISABLED_STRATEGIES` - Never use these strategies (e.g., "browser")
//!
//! Disabled always wins over enabled. Neither setting changes the relative order.
//!
//! ```bash
//! # No Chromium on this machine
//! export ARTICLE_SCOUT_DISABLED_STRATEGIES="browser"
//! ```

mod archive;
mod browser;
mod bypass;
mod cache;
mod chain;
mod direct;
mod reader;

pub mod mock;

pub use archive::ArchiveStrategy;
pub use browser::StealthBrowserStrategy;
pub use bypass::DefenseBypassStrategy;
pub use cache::CacheMirrorStrategy;
pub use chain::{StrategyChain, StrategySelection};
pub use direct::DirectFetchStrategy;
pub use mock::MockStrategy;
pub use reader::ReaderProxyStrategy;

use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::models::{RawDocument, StrategyKind};

/// One way of fetching a URL's content.
///
/// # Implementing a New Strategy
///
/// 1. Create a struct that implements `Strategy`
/// 2. Return [`RawDocument::html`] for markup or [`RawDocument::text`] for prose
///    the strategy already rendered
/// 3. Report every failure as a [`StrategyError`]; never panic past `fetch`
/// 4. Insert it into a chain with [`StrategyChain::with_strategies`]
#[async_trait]
pub trait Strategy: Send + Sync + std::fmt::Debug {
    /// Provenance tag for documents this strategy produces
    fn kind(&self) -> StrategyKind;

    /// Upper bound on a single attempt, fetch and extraction together, enforced by the chain
    fn timeout(&self) -> Duration;

    /// Fetch the page behind `url`
    async fn fetch(&self, url: &Url) -> Result<RawDocument, StrategyError>;
}

/// Ways a single strategy attempt can fail.
///
/// None of these reach the caller of [`StrategyChain::acquire`]; each one just
/// moves the chain on to the next strategy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StrategyError {
    /// Connection, TLS, DNS or body read failure
    #[error("Network error: {0}")]
    Network(String),

    /// The strategy ran past its time budget
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered with a non-success status
    #[error("HTTP status {0}")]
    Http(u16),

    /// Content was fetched but looks like a challenge or denial page
    #[error("Content classified as a block page")]
    BlockedContent,

    /// Extracted text is below the minimum viable length
    #[error("Extracted text below minimum length")]
    LowConfidenceExtraction,

    /// A cache mirror returned only a redirect notice
    #[error("Redirect stub instead of content")]
    RedirectStub,

    /// Output carries a known low-quality marker
    #[error("Low quality output: {0}")]
    LowQuality(String),

    /// The strategy cannot run in this environment
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl StrategyError {
    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            StrategyError::Network(_) => "network",
            StrategyError::Timeout(_) => "timeout",
            StrategyError::Http(_) => "http",
            StrategyError::BlockedContent => "blocked",
            StrategyError::LowConfidenceExtraction => "low_confidence",
            StrategyError::RedirectStub => "redirect_stub",
            StrategyError::LowQuality(_) => "low_quality",
            StrategyError::Unsupported(_) => "unsupported",
        }
    }
}

impl From<reqwest::Error> for StrategyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return StrategyError::Timeout(Duration::ZERO);
        }
        if let Some(status) = err.status() {
            return StrategyError::Http(status.as_u16());
        }
        StrategyError::Network(err.to_string())
    }
}

/// Send a prepared GET and return the body of a 200 response
pub(crate) async fn read_ok_body(
    request: reqwest::RequestBuilder,
) -> Result<(String, u16), StrategyError> {
    let response = request.send().await?;
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(StrategyError::Http(status.as_u16()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| StrategyError::Network(format!("Failed to read body: {}", e)))?;
    Ok((body, status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_labels_are_distinct() {
        let errors = [
            StrategyError::Network("x".into()),
            StrategyError::Timeout(Duration::from_secs(1)),
            StrategyError::Http(403),
            StrategyError::BlockedContent,
            StrategyError::LowConfidenceExtraction,
            StrategyError::RedirectStub,
            StrategyError::LowQuality("x".into()),
            StrategyError::Unsupported("x".into()),
        ];
        let mut labels: Vec<_> = errors.iter().map(|e| e.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), errors.len());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(StrategyError::Http(503).to_string(), "HTTP status 503");
        assert_eq!(
            StrategyError::Unsupported("no chromium".into()).to_string(),
            "Unsupported: no chromium"
        );
    }
}
