//! HTTP client utilities.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, ClientBuilder, Proxy};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{HttpConfig, ProxyConfig};

/// User agent of a current desktop Chrome on Windows
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Accept headers a desktop browser sends for a top-level navigation
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers
}

/// Apply connection settings shared by every client this crate builds
pub fn configure_builder(
    builder: ClientBuilder,
    http: &HttpConfig,
    proxy: &ProxyConfig,
) -> Result<ClientBuilder, reqwest::Error> {
    let mut builder = builder
        .user_agent(http.user_agent.as_str())
        .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
        .pool_idle_timeout(Duration::from_secs(90))
        .gzip(true)
        .brotli(true)
        .deflate(true);

    let no_proxy = proxy.no_proxy.as_deref().and_then(reqwest::NoProxy::from_string);
    if let Some(http_proxy) = &proxy.http {
        builder = builder.proxy(Proxy::http(http_proxy)?.no_proxy(no_proxy.clone()));
    }
    if let Some(https_proxy) = &proxy.https {
        builder = builder.proxy(Proxy::https(https_proxy)?.no_proxy(no_proxy));
    }

    Ok(builder)
}

/// Shared HTTP client with browser-like defaults
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::from_config(&HttpConfig::default(), &ProxyConfig::default())
    }

    /// Create a client from configuration
    pub fn from_config(http: &HttpConfig, proxy: &ProxyConfig) -> Result<Self, reqwest::Error> {
        let client = configure_builder(Client::builder(), http, proxy)?
            .default_headers(browser_headers())
            .build()?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Create from an existing reqwest Client
    pub fn from_client(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// Get the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Start a GET request
    pub fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.get(url)
    }
}
