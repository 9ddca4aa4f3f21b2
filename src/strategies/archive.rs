//! Archive mirror strategy (Wayback Machine).
//!
//! Rewrites the target into an archive URL and fetches that instead. Gets past
//! most paywalls and blocks, at the cost of possibly stale content.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::Config;
use crate::models::{RawDocument, StrategyKind};
use crate::strategies::{read_ok_body, Strategy, StrategyError};
use crate::utils::HttpClient;

#[derive(Debug, Clone)]
pub struct ArchiveStrategy {
    client: Arc<HttpClient>,
    base_url: String,
    timeout: Duration,
}

impl ArchiveStrategy {
    pub fn new(client: Arc<HttpClient>, config: &Config) -> Self {
        Self {
            client,
            base_url: config.services.archive_base.clone(),
            timeout: config
                .strategies
                .timeouts
                .for_kind(StrategyKind::ArchiveMirror),
        }
    }

    /// Archive URL for a target
    pub fn mirror_url(&self, url: &Url) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), url.as_str())
    }
}

#[async_trait]
impl Strategy for ArchiveStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ArchiveMirror
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, url: &Url) -> Result<RawDocument, StrategyError> {
        let mirror = self.mirror_url(url);
        tracing::debug!("Fetching archive mirror {}", mirror);

        let (body, status) = read_ok_body(self.client.get(&mirror)).await?;
        Ok(RawDocument::html(body, self.kind(), Some(status)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy(base: &str) -> ArchiveStrategy {
        let mut config = Config::default();
        config.services.archive_base = base.to_string();
        ArchiveStrategy::new(Arc::new(HttpClient::new().unwrap()), &config)
    }

    #[test]
    fn test_mirror_url() {
        let s = strategy("https://web.archive.org/web/");
        let url = Url::parse("http://example.com/story?id=1").unwrap();
        assert_eq!(
            s.mirror_url(&url),
            "https://web.archive.org/web/http://example.com/story?id=1"
        );
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/web/http://example.com/story")
            .with_status(200)
            .with_body("<html><body><p>Archived</p></body></html>")
            .create_async()
            .await;

        let s = strategy(&format!("{}/web", server.url()));
        let doc = s
            .fetch(&Url::parse("http://example.com/story").unwrap())
            .await
            .unwrap();

        assert!(doc.body.contains("Archived"));
        assert_eq!(doc.strategy, StrategyKind::ArchiveMirror);
        assert_eq!(doc.status, Some(200));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_non_200_fails() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/web/http://example.com/missing")
            .with_status(404)
            .create_async()
            .await;

        let s = strategy(&format!("{}/web", server.url()));
        let result = s
            .fetch(&Url::parse("http://example.com/missing").unwrap())
            .await;
        assert_eq!(result.unwrap_err(), StrategyError::Http(404));
    }
}
