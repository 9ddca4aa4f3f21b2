//! Plain GET with browser-like headers.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::Config;
use crate::models::{RawDocument, StrategyKind};
use crate::strategies::{read_ok_body, Strategy, StrategyError};
use crate::utils::HttpClient;

/// Direct fetch through the shared client
#[derive(Debug, Clone)]
pub struct DirectFetchStrategy {
    client: Arc<HttpClient>,
    timeout: Duration,
}

impl DirectFetchStrategy {
    pub fn new(client: Arc<HttpClient>, config: &Config) -> Self {
        Self {
            client,
            timeout: config
                .strategies
                .timeouts
                .for_kind(StrategyKind::DirectFetch),
        }
    }
}

#[async_trait]
impl Strategy for DirectFetchStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DirectFetch
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, url: &Url) -> Result<RawDocument, StrategyError> {
        let (body, status) = read_ok_body(self.client.get(url.as_str())).await?;
        Ok(RawDocument::html(body, self.kind(), Some(status)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentFormat;

    fn strategy() -> DirectFetchStrategy {
        DirectFetchStrategy::new(Arc::new(HttpClient::new().unwrap()), &Config::default())
    }

    #[tokio::test]
    async fn test_fetch_sends_browser_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/article")
            .match_header("accept-language", "en-US,en;q=0.5")
            .match_header("user-agent", mockito::Matcher::Regex("Chrome".into()))
            .with_status(200)
            .with_body("<html><body><p>Hello</p></body></html>")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/article", server.url())).unwrap();
        let doc = strategy().fetch(&url).await.unwrap();

        assert_eq!(doc.format, DocumentFormat::Html);
        assert_eq!(doc.strategy, StrategyKind::DirectFetch);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_forbidden() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/article")
            .with_status(403)
            .with_body("Forbidden")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/article", server.url())).unwrap();
        assert_eq!(
            strategy().fetch(&url).await.unwrap_err(),
            StrategyError::Http(403)
        );
    }

    #[test]
    fn test_timeout_from_config() {
        assert_eq!(strategy().timeout(), Duration::from_secs(15));
    }
}
