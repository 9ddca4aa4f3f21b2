//! Search engine cache mirror, the strategy of last resort.
//!
//! The cache frequently answers with a tiny "you are being redirected" page
//! instead of the snapshot. Those stubs pass an HTTP status check, so this
//! strategy rejects them before handing the snapshot to the chain for
//! extraction.

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::Config;
use crate::extract::{collapse_whitespace, filtered_text};
use crate::models::{RawDocument, StrategyKind};
use crate::strategies::{read_ok_body, Strategy, StrategyError};
use crate::utils::HttpClient;

/// Notices that give away a redirect stub
pub const REDIRECT_NOTICES: &[&str] = &[
    "not redirected",
    "click here if",
    "redirecting you",
    "if you are not redirected",
];

/// Visible text at or above this length is never treated as a stub
const STUB_TEXT_CHARS: usize = 1000;

/// Markup below this size carrying a meta refresh is a stub
const STUB_MARKUP_BYTES: usize = 2000;

#[derive(Debug, Clone)]
pub struct CacheMirrorStrategy {
    client: Arc<HttpClient>,
    base_url: String,
    timeout: Duration,
}

impl CacheMirrorStrategy {
    pub fn new(client: Arc<HttpClient>, config: &Config) -> Self {
        Self {
            client,
            base_url: config.services.cache_base.clone(),
            timeout: config
                .strategies
                .timeouts
                .for_kind(StrategyKind::CacheMirror),
        }
    }
}

/// Whether a cached page is a redirect stub rather than the snapshot
pub(crate) fn is_stub(markup: &str) -> bool {
    let document = Html::parse_document(markup);
    if markup.len() < STUB_MARKUP_BYTES && has_meta_refresh(&document) {
        return true;
    }

    let visible = collapse_whitespace(&filtered_text(document.root_element()));
    is_redirect_notice(&visible)
}

fn has_meta_refresh(document: &Html) -> bool {
    let Ok(selector) = Selector::parse("meta[http-equiv]") else {
        return false;
    };
    let found = document.select(&selector).any(|meta| {
        meta.value()
            .attr("http-equiv")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("refresh"))
    });
    found
}

/// Short text that is just a redirect notice
pub(crate) fn is_redirect_notice(text: &str) -> bool {
    if text.chars().count() >= STUB_TEXT_CHARS {
        return false;
    }
    let lower = text.to_lowercase();
    REDIRECT_NOTICES.iter().any(|notice| lower.contains(notice))
}

#[async_trait]
impl Strategy for CacheMirrorStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::CacheMirror
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, url: &Url) -> Result<RawDocument, StrategyError> {
        let request = self
            .client
            .get(&self.base_url)
            .query(&[("q", format!("cache:{}", url))]);
        let (markup, status) = read_ok_body(request).await?;

        let (markup, stub) = tokio::task::spawn_blocking(move || {
            let stub = is_stub(&markup);
            (markup, stub)
        })
        .await
        .map_err(|e| StrategyError::Network(format!("Stub check failed: {}", e)))?;

        if stub {
            return Err(StrategyError::RedirectStub);
        }
        Ok(RawDocument::html(markup, self.kind(), Some(status)))
    }
}
