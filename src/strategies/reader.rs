//! Reader proxy strategy.
//!
//! The proxy renders the page on its side and returns plain prose, so the
//! result skips markup extraction. Its own failures come back as a 200 with an
//! error page in the body, which is why the output is screened for markers.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::Config;
use crate::models::{RawDocument, StrategyKind};
use crate::strategies::{read_ok_body, Strategy, StrategyError};
use crate::utils::HttpClient;

/// Markers that mean the proxy relayed a denial instead of the article
pub const LOW_QUALITY_MARKERS: &[&str] = &[
    "access denied",
    "enable javascript",
    "javascript is required",
    "please enable js",
    "403 forbidden",
    "you have been blocked",
    "are you a robot",
];

#[derive(Debug, Clone)]
pub struct ReaderProxyStrategy {
    client: Arc<HttpClient>,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl ReaderProxyStrategy {
    pub fn new(client: Arc<HttpClient>, config: &Config) -> Self {
        Self {
            client,
            base_url: config.services.reader_base.clone(),
            api_key: config.services.reader_api_key.clone(),
            timeout: config
                .strategies
                .timeouts
                .for_kind(StrategyKind::ReaderProxy),
        }
    }

    pub fn proxy_url(&self, url: &Url) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), url.as_str())
    }
}

/// First low-quality marker found in `body`, if any
pub(crate) fn low_quality_marker(body: &str) -> Option<&'static str> {
    let lower = body.to_lowercase();
    LOW_QUALITY_MARKERS
        .iter()
        .copied()
        .find(|marker| lower.contains(marker))
}

#[async_trait]
impl Strategy for ReaderProxyStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ReaderProxy
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, url: &Url) -> Result<RawDocument, StrategyError> {
        let mut request = self.client.get(&self.proxy_url(url));
        if let Some(key) = &self.api_key {
            request = request.header(AUTHORIZATION, format!("Bearer {}", key));
        }

        let (body, status) = read_ok_body(request).await?;
        if let Some(marker) = low_quality_marker(&body) {
            return Err(StrategyError::LowQuality(marker.to_string()));
        }

        Ok(RawDocument::text(body, self.kind(), Some(status)))
    }
}
