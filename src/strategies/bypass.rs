//! Defense-bypass HTTP client.
//!
//! Presents the full header fingerprint of a desktop Chrome navigation and
//! keeps cookies for the duration of one fetch. Many bot walls set a clearance
//! cookie on the first (rejected) response and accept the second request that
//! carries it, so a challenge response earns exactly one follow-up.

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT_ENCODING, CACHE_CONTROL, SET_COOKIE,
    UPGRADE_INSECURE_REQUESTS,
};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use url::Url;

use crate::config::{Config, HttpConfig, ProxyConfig};
use crate::models::{RawDocument, StrategyKind};
use crate::strategies::{Strategy, StrategyError};
use crate::utils::{browser_headers, configure_builder};

/// Cookies set by bot walls alongside a challenge response
pub const CHALLENGE_COOKIES: &[&str] = &["__cf_bm", "cf_clearance"];

#[derive(Debug, Clone)]
pub struct DefenseBypassStrategy {
    http: HttpConfig,
    proxy: ProxyConfig,
    timeout: Duration,
}

impl DefenseBypassStrategy {
    pub fn new(config: &Config) -> Self {
        Self {
            http: config.http.clone(),
            proxy: config.proxy.clone(),
            timeout: config
                .strategies
                .timeouts
                .for_kind(StrategyKind::DefenseBypass),
        }
    }

    /// A client with its own cookie jar, used for a single fetch
    fn session_client(&self) -> Result<Client, StrategyError> {
        let builder = configure_builder(Client::builder(), &self.http, &self.proxy)?;
        builder
            .cookie_store(true)
            .default_headers(chrome_headers())
            .build()
            .map_err(|e| StrategyError::Network(format!("Failed to build client: {}", e)))
    }
}

/// Client hints and fetch metadata Chrome sends on a top-level navigation
pub fn chrome_headers() -> HeaderMap {
    let mut headers = browser_headers();
    headers.insert(
        ACCEPT_ENCODING,
        HeaderValue::from_static("gzip, deflate, br"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

    let hints = [
        (
            "sec-ch-ua",
            r#""Not_A Brand";v="8", "Chromium";v="120", "Google Chrome";v="120""#,
        ),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", r#""Windows""#),
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "none"),
        ("sec-fetch-user", "?1"),
    ];
    for (name, value) in hints {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers
}

/// Whether a rejected response handed out a clearance cookie worth retrying with
pub(crate) fn is_cookie_challenge(response: &Response) -> bool {
    let status = response.status();
    if status != StatusCode::FORBIDDEN && status != StatusCode::SERVICE_UNAVAILABLE {
        return false;
    }

    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|cookie| {
            CHALLENGE_COOKIES
                .iter()
                .any(|name| cookie.trim_start().starts_with(&format!("{}=", name)))
        })
}

#[async_trait]
impl Strategy for DefenseBypassStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DefenseBypass
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, url: &Url) -> Result<RawDocument, StrategyError> {
        let client = self.session_client()?;

        let mut response = client.get(url.as_str()).send().await?;
        if is_cookie_challenge(&response) {
            tracing::debug!(
                "Challenge cookie received from {} ({}), retrying once",
                url,
                response.status()
            );
            response = client.get(url.as_str()).send().await?;
        }

        let status = response.status();
        if status != StatusCode::OK {
            return Err(StrategyError::Http(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| StrategyError::Network(format!("Failed to read body: {}", e)))?;
        Ok(RawDocument::html(body, self.kind(), Some(status.as_u16())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> DefenseBypassStrategy {
        DefenseBypassStrategy::new(&Config::default())
    }

    #[test]
    fn test_chrome_headers() {
        let headers = chrome_headers();
        assert_eq!(headers["sec-fetch-mode"], "navigate");
        assert_eq!(headers["upgrade-insecure-requests"], "1");
        assert!(headers["sec-ch-ua"].to_str().unwrap().contains("Chromium"));
        assert!(headers.contains_key("accept-language"));
    }

    #[tokio::test]
    async fn test_fetch_sends_fingerprint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/story")
            .match_header("sec-fetch-dest", "document")
            .match_header("sec-ch-ua-mobile", "?0")
            .with_status(200)
            .with_body("<html><body><p>Story</p></body></html>")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/story", server.url())).unwrap();
        let doc = strategy().fetch(&url).await.unwrap();

        assert_eq!(doc.strategy, StrategyKind::DefenseBypass);
        assert_eq!(doc.status, Some(200));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_challenge_cookie_earns_one_retry() {
        let mut server = mockito::Server::new_async().await;
        let challenge = server
            .mock("GET", "/story")
            .match_header("cookie", mockito::Matcher::Missing)
            .with_status(403)
            .with_header("set-cookie", "__cf_bm=token; Path=/")
            .with_body("Just a moment...")
            .expect(1)
            .create_async()
            .await;
        let cleared = server
            .mock("GET", "/story")
            .match_header("cookie", mockito::Matcher::Regex("__cf_bm=token".into()))
            .with_status(200)
            .with_body("<html><body><p>Story</p></body></html>")
            .expect(1)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/story", server.url())).unwrap();
        let doc = strategy().fetch(&url).await.unwrap();

        assert!(doc.body.contains("Story"));
        challenge.assert_async().await;
        cleared.assert_async().await;
    }

    #[tokio::test]
    async fn test_plain_403_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/story")
            .with_status(403)
            .expect(1)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/story", server.url())).unwrap();
        assert_eq!(
            strategy().fetch(&url).await.unwrap_err(),
            StrategyError::Http(403)
        );
        mock.assert_async().await;
    }
}
