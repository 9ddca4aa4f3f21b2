//! Stealth headless browser strategy.
//!
//! Renders the page in Chromium with the usual automation tells hidden, for
//! sites that only serve content after JavaScript runs. Requires the
//! `stealth-browser` feature and a Chromium binary on the machine.

use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::config::{BrowserConfig, Config};
use crate::models::{RawDocument, StrategyKind};
use crate::strategies::{Strategy, StrategyError};

/// Runs before any page script and hides the automation markers
pub const STEALTH_SCRIPT: &str = r#"
    Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
    Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
    Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
    window.chrome = { runtime: {} };
"#;

/// Chromium flags that disable automation signals
pub const STEALTH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-infobars",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--no-sandbox",
    "--window-size=1920,1080",
    "--disable-extensions",
    "--disable-popup-blocking",
    "--disable-background-networking",
    "--disable-sync",
    "--disable-translate",
    "--no-first-run",
];

#[derive(Debug, Clone)]
pub struct StealthBrowserStrategy {
    settings: BrowserConfig,
    user_agent: String,
    timeout: Duration,
}

impl StealthBrowserStrategy {
    pub fn new(config: &Config) -> Self {
        Self {
            settings: config.browser.clone(),
            user_agent: config.http.user_agent.clone(),
            timeout: config
                .strategies
                .timeouts
                .for_kind(StrategyKind::StealthBrowser),
        }
    }

    /// Delay between navigation and reading the rendered DOM
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settings.settle_ms)
    }

    /// Full Chromium argument list, including the user agent override
    pub fn launch_args(&self) -> Vec<String> {
        let mut args: Vec<String> = STEALTH_ARGS.iter().map(|a| a.to_string()).collect();
        args.push(format!("--user-agent={}", self.user_agent));
        args
    }
}

#[async_trait]
impl Strategy for StealthBrowserStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StealthBrowser
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    #[cfg(feature = "stealth-browser")]
    async fn fetch(&self, url: &Url) -> Result<RawDocument, StrategyError> {
        let session = session::BrowserSession::launch(&self.settings, self.launch_args()).await?;
        let html = session.render(url, STEALTH_SCRIPT, self.settle_delay()).await;
        session.shutdown().await;

        Ok(RawDocument::html(html?, self.kind(), None))
    }

    #[cfg(not(feature = "stealth-browser"))]
    async fn fetch(&self, _url: &Url) -> Result<RawDocument, StrategyError> {
        Err(StrategyError::Unsupported(
            "built without the stealth-browser feature".to_string(),
        ))
    }
}

#[cfg(feature = "stealth-browser")]
mod session {
    use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
    use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
    use futures_util::StreamExt;
    use std::time::Duration;
    use tokio::task::JoinHandle;
    use url::Url;

    use crate::config::BrowserConfig;
    use crate::strategies::StrategyError;

    /// A running Chromium plus its CDP event loop.
    ///
    /// Dropping the session (including when the enclosing future is cancelled)
    /// aborts the event loop, and dropping the `Browser` kills the process.
    pub(super) struct BrowserSession {
        browser: Browser,
        handler: JoinHandle<()>,
    }

    impl BrowserSession {
        pub(super) async fn launch(
            settings: &BrowserConfig,
            args: Vec<String>,
        ) -> Result<Self, StrategyError> {
            let mut builder = LaunchConfig::builder().args(args);
            if let Some(path) = &settings.executable {
                builder = builder.chrome_executable(path);
            }
            if !settings.headless {
                builder = builder.with_head();
            }
            let launch_config = builder
                .build()
                .map_err(|e| StrategyError::Unsupported(format!("Browser config error: {}", e)))?;

            let (browser, mut handler) = Browser::launch(launch_config).await.map_err(|e| {
                StrategyError::Unsupported(format!("Failed to launch browser: {}", e))
            })?;
            let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

            tracing::debug!("Launched headless browser");
            Ok(Self { browser, handler })
        }

        pub(super) async fn render(
            &self,
            url: &Url,
            stealth_script: &str,
            settle: Duration,
        ) -> Result<String, StrategyError> {
            let page = self
                .browser
                .new_page("about:blank")
                .await
                .map_err(|e| StrategyError::Network(format!("Failed to create page: {}", e)))?;

            if let Err(e) = page
                .execute(AddScriptToEvaluateOnNewDocumentParams::new(stealth_script))
                .await
            {
                tracing::debug!("Stealth script injection failed: {}", e);
            }

            page.goto(url.as_str())
                .await
                .map_err(|e| StrategyError::Network(format!("Failed to navigate: {}", e)))?;

            tokio::time::sleep(settle).await;

            page.content()
                .await
                .map_err(|e| StrategyError::Network(format!("Failed to read page content: {}", e)))
        }

        /// Close the browser gracefully; `Drop` covers every other exit path
        pub(super) async fn shutdown(mut self) {
            if let Err(e) = self.browser.close().await {
                tracing::debug!("Browser close failed: {}", e);
            }
            if let Err(e) = self.browser.wait().await {
                tracing::debug!("Browser wait failed: {}", e);
            }
        }
    }

    impl Drop for BrowserSession {
        fn drop(&mut self) {
            self.handler.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_args_include_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "TestAgent/1.0".to_string();
        let strategy = StealthBrowserStrategy::new(&config);

        let args = strategy.launch_args();
        assert!(args.contains(&"--disable-blink-features=AutomationControlled".to_string()));
        assert_eq!(args.last().unwrap(), "--user-agent=TestAgent/1.0");
    }

    #[test]
    fn test_defaults() {
        let strategy = StealthBrowserStrategy::new(&Config::default());
        assert_eq!(strategy.kind(), StrategyKind::StealthBrowser);
        assert_eq!(strategy.timeout(), Duration::from_secs(30));
        assert_eq!(strategy.settle_delay(), Duration::from_millis(2000));
        assert!(STEALTH_SCRIPT.contains("webdriver"));
    }

    #[cfg(not(feature = "stealth-browser"))]
    #[tokio::test]
    async fn test_unsupported_without_feature() {
        let strategy = StealthBrowserStrategy::new(&Config::default());
        let err = strategy
            .fetch(&Url::parse("https://example.com").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.label(), "unsupported");
    }

    #[cfg(feature = "stealth-browser")]
    #[tokio::test]
    #[ignore = "requires a local Chromium install"]
    async fn test_renders_page_with_chromium() {
        let strategy = StealthBrowserStrategy::new(&Config::default());
        let doc = strategy
            .fetch(&Url::parse("https://example.com").unwrap())
            .await
            .unwrap();
        assert!(doc.body.contains("Example Domain"));
        assert_eq!(doc.strategy, StrategyKind::StealthBrowser);
    }
}
