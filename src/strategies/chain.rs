//! Ordered strategy execution.

use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

use super::{
    ArchiveStrategy, CacheMirrorStrategy, DefenseBypassStrategy, DirectFetchStrategy,
    ReaderProxyStrategy, StealthBrowserStrategy, Strategy, StrategyError,
};
use crate::config::Config;
use crate::extract::{BlockDetector, ContentExtractor, PhraseBlockDetector};
use crate::models::{
    AcquisitionOutcome, DocumentFormat, ExtractedContent, RawDocument, RetrievalRequest,
    StrategyKind,
};
use crate::utils::HttpClient;

bitflags::bitflags! {
    /// Set of strategies allowed to run
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StrategySelection: u32 {
        const BYPASS = 1 << 0;
        const BROWSER = 1 << 1;
        const ARCHIVE = 1 << 2;
        const READER = 1 << 3;
        const DIRECT = 1 << 4;
        const CACHE = 1 << 5;
    }
}

impl StrategySelection {
    /// The flag for one strategy
    pub fn of(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::DefenseBypass => Self::BYPASS,
            StrategyKind::StealthBrowser => Self::BROWSER,
            StrategyKind::ArchiveMirror => Self::ARCHIVE,
            StrategyKind::ReaderProxy => Self::READER,
            StrategyKind::DirectFetch => Self::DIRECT,
            StrategyKind::CacheMirror => Self::CACHE,
        }
    }

    /// Parse a comma-separated id list. Unknown ids are logged and skipped.
    pub fn parse_list(list: &str) -> Self {
        let mut selection = Self::empty();
        for id in list.split(',').map(str::trim).filter(|id| !id.is_empty()) {
            match StrategyKind::from_id(id) {
                Some(kind) => selection |= Self::of(kind),
                None => tracing::warn!("Ignoring unknown strategy id '{}'", id),
            }
        }
        selection
    }

    /// Apply the enabled and disabled lists.
    ///
    /// With no enabled list every strategy starts enabled. The disabled list
    /// always wins.
    pub fn from_lists(enabled: Option<&str>, disabled: Option<&str>) -> Self {
        let base = enabled.map(Self::parse_list).unwrap_or_else(Self::all);
        let removed = disabled.map(Self::parse_list).unwrap_or_else(Self::empty);
        base - removed
    }

    pub fn includes(&self, kind: StrategyKind) -> bool {
        self.contains(Self::of(kind))
    }
}

/// Tries each strategy in order until one produces accepted content.
///
/// Holds no mutable state; share it behind an `Arc` across tasks.
#[derive(Debug, Clone)]
pub struct StrategyChain {
    strategies: Vec<Arc<dyn Strategy>>,
    extractor: ContentExtractor,
    detector: Arc<dyn BlockDetector>,
}

impl StrategyChain {
    /// The default chain with default configuration
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::from_config(&Config::default())
    }

    /// Build the six standard strategies, filtered by the configured selection
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Arc::new(HttpClient::from_config(&config.http, &config.proxy)?);
        let selection = StrategySelection::from_lists(
            config.strategies.enabled.as_deref(),
            config.strategies.disabled.as_deref(),
        );

        let strategies: Vec<Arc<dyn Strategy>> = StrategyKind::ALL
            .iter()
            .copied()
            .filter(|kind| selection.includes(*kind))
            .map(|kind| -> Arc<dyn Strategy> {
                match kind {
                    StrategyKind::DefenseBypass => Arc::new(DefenseBypassStrategy::new(config)),
                    StrategyKind::StealthBrowser => Arc::new(StealthBrowserStrategy::new(config)),
                    StrategyKind::ArchiveMirror => {
                        Arc::new(ArchiveStrategy::new(Arc::clone(&client), config))
                    }
                    StrategyKind::ReaderProxy => {
                        Arc::new(ReaderProxyStrategy::new(Arc::clone(&client), config))
                    }
                    StrategyKind::DirectFetch => {
                        Arc::new(DirectFetchStrategy::new(Arc::clone(&client), config))
                    }
                    StrategyKind::CacheMirror => {
                        Arc::new(CacheMirrorStrategy::new(Arc::clone(&client), config))
                    }
                }
            })
            .collect();

        if strategies.is_empty() {
            tracing::warn!("Strategy selection leaves the chain empty; every acquire will fail");
        }

        let detector =
            PhraseBlockDetector::new().with_extra_phrases(&config.detection.extra_phrases);
        let extractor = ContentExtractor::new().with_min_chars(config.detection.min_content_chars);

        Ok(Self::with_strategies(strategies)
            .with_detector(Arc::new(detector))
            .with_extractor(extractor))
    }

    /// A chain over an arbitrary ordered strategy list
    pub fn with_strategies(strategies: Vec<Arc<dyn Strategy>>) -> Self {
        Self {
            strategies,
            extractor: ContentExtractor::new(),
            detector: Arc::new(PhraseBlockDetector::new()),
        }
    }

    pub fn with_detector(mut self, detector: Arc<dyn BlockDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_extractor(mut self, extractor: ContentExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Strategy kinds in the order they run
    pub fn kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Upper bound on the time one `acquire` spends in strategies, extraction included
    pub fn total_timeout(&self) -> Duration {
        self.strategies.iter().map(|s| s.timeout()).sum()
    }

    /// Acquire clean article text for `url`.
    ///
    /// Never fails with an error: every strategy failure is absorbed and the
    /// outcome only says whether content was found.
    pub async fn acquire(&self, url: &str) -> AcquisitionOutcome {
        let request = match RetrievalRequest::parse(url) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Rejected URL {:?}: {}", url, e);
                return AcquisitionOutcome::invalid_url(e);
            }
        };

        for strategy in &self.strategies {
            let kind = strategy.kind();
            let started = Instant::now();
            tracing::debug!(strategy = kind.id(), url = %request.url(), "Trying strategy");

            match self.attempt(strategy.as_ref(), request.url()).await {
                Ok(content) => {
                    tracing::info!(
                        strategy = kind.id(),
                        chars = content.length,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Acquired {}",
                        request.url()
                    );
                    return AcquisitionOutcome::Success(content);
                }
                Err(e) => {
                    tracing::debug!(
                        strategy = kind.id(),
                        error = e.label(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Strategy failed: {}",
                        e
                    );
                }
            }
        }

        tracing::warn!("All strategies failed for {}", request.url());
        AcquisitionOutcome::exhausted()
    }

    async fn attempt(
        &self,
        strategy: &dyn Strategy,
        url: &Url,
    ) -> Result<ExtractedContent, StrategyError> {
        let limit = strategy.timeout();
        // Extraction counts against the same deadline as the fetch
        let work = async {
            let document = strategy.fetch(url).await?;
            self.accept(document).await
        };

        tokio::time::timeout(limit, work)
            .await
            .map_err(|_| StrategyError::Timeout(limit))?
    }

    /// Run extraction and block detection over a fetched document
    async fn accept(&self, document: RawDocument) -> Result<ExtractedContent, StrategyError> {
        let RawDocument { body, strategy, format, .. } = document;

        let text = match format {
            DocumentFormat::Text => classify_text(&self.extractor, self.detector.as_ref(), &body)?,
            DocumentFormat::Html => {
                let extractor = self.extractor.clone();
                let detector = Arc::clone(&self.detector);
                tokio::task::spawn_blocking(move || {
                    classify_markup(&extractor, detector.as_ref(), &body)
                })
                .await
                .map_err(|e| StrategyError::Network(format!("Extraction task failed: {}", e)))??
            }
        };

        Ok(ExtractedContent::new(text, strategy))
    }
}

fn classify_text(
    extractor: &ContentExtractor,
    detector: &dyn BlockDetector,
    text: &str,
) -> Result<String, StrategyError> {
    let text = text.trim();
    if !extractor.meets_minimum(text) {
        return Err(StrategyError::LowConfidenceExtraction);
    }
    if detector.is_blocked(text) {
        return Err(StrategyError::BlockedContent);
    }
    Ok(text.to_string())
}

fn classify_markup(
    extractor: &ContentExtractor,
    detector: &dyn BlockDetector,
    markup: &str,
) -> Result<String, StrategyError> {
    if let Some(text) = extractor.extract_accepted(markup, detector) {
        return Ok(text);
    }
    // Something long enough came out, so the detector must have rejected it
    match extractor.extract(markup) {
        Some(_) => Err(StrategyError::BlockedContent),
        None => Err(StrategyError::LowConfidenceExtraction),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FailureKind;
    use crate::strategies::MockStrategy;

    fn article_html() -> String {
        format!(
            "<html><body><article><h1>Headline</h1><p>{}</p><p>{}</p></article></body></html>",
            "The council voted on Tuesday to expand the library, citing demand. ".repeat(4),
            "Residents had petitioned for longer opening hours for years. ".repeat(3)
        )
    }

    const CHALLENGE_HTML: &str = "<html><body><h1>Just a moment...</h1>\
        <p>Checking your browser before accessing the site. This process is automatic, \
        and your browser will redirect shortly. Ray ID: 1234abcd. Performance and \
        security by Cloudflare.</p></body></html>";

    #[test]
    fn test_selection_from_lists() {
        assert_eq!(StrategySelection::from_lists(None, None), StrategySelection::all());

        let only = StrategySelection::from_lists(Some("bypass, direct"), None);
        assert!(only.includes(StrategyKind::DefenseBypass));
        assert!(only.includes(StrategyKind::DirectFetch));
        assert!(!only.includes(StrategyKind::ArchiveMirror));

        let both = StrategySelection::from_lists(Some("bypass,direct"), Some("direct"));
        assert_eq!(both, StrategySelection::BYPASS);

        let unknown = StrategySelection::from_lists(None, Some("browser,gopher"));
        assert!(!unknown.includes(StrategyKind::StealthBrowser));
        assert!(unknown.includes(StrategyKind::CacheMirror));
    }

    #[test]
    fn test_from_config_keeps_order() {
        let mut config = Config::default();
        config.strategies.enabled = None;
        config.strategies.disabled = Some("browser".to_string());
        config.detection.min_content_chars = 500;

        let chain = StrategyChain::from_config(&config).unwrap();
        assert!(!chain.extractor.meets_minimum(&"x".repeat(500)));
        assert!(chain.extractor.meets_minimum(&"x".repeat(501)));
        assert_eq!(
            chain.kinds(),
            vec![
                StrategyKind::DefenseBypass,
                StrategyKind::ArchiveMirror,
                StrategyKind::ReaderProxy,
                StrategyKind::DirectFetch,
                StrategyKind::CacheMirror,
            ]
        );
        assert_eq!(chain.total_timeout(), Duration::from_secs(90));
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let first = MockStrategy::failing(StrategyKind::DefenseBypass, StrategyError::Http(403));
        let second = MockStrategy::html(StrategyKind::ArchiveMirror, article_html());
        let third = MockStrategy::html(StrategyKind::DirectFetch, article_html());

        let chain = StrategyChain::with_strategies(vec![
            Arc::new(first.clone()),
            Arc::new(second.clone()),
            Arc::new(third.clone()),
        ]);

        let outcome = chain.acquire("https://example.com/news").await;
        let content = outcome.content().unwrap();
        assert_eq!(content.provenance, StrategyKind::ArchiveMirror);
        assert!(content.text.contains("council voted"));
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
        assert_eq!(third.calls(), 0);
    }

    #[tokio::test]
    async fn test_challenge_page_moves_on() {
        let blocked = MockStrategy::html(StrategyKind::DirectFetch, CHALLENGE_HTML);
        let good = MockStrategy::text(StrategyKind::ReaderProxy, article_html());

        let chain = StrategyChain::with_strategies(vec![Arc::new(blocked), Arc::new(good)]);
        let outcome = chain.acquire("https://example.com/news").await;

        assert_eq!(outcome.content().unwrap().provenance, StrategyKind::ReaderProxy);
    }

    #[tokio::test]
    async fn test_invalid_url_skips_strategies() {
        let strategy = MockStrategy::html(StrategyKind::DirectFetch, article_html());
        let chain = StrategyChain::with_strategies(vec![Arc::new(strategy.clone())]);

        let outcome = chain.acquire("ftp://example.com/file").await;
        assert!(matches!(
            outcome,
            AcquisitionOutcome::Failure {
                kind: FailureKind::InvalidUrl,
                ..
            }
        ));
        assert_eq!(strategy.calls(), 0);
    }

    #[tokio::test]
    async fn test_slow_strategy_times_out() {
        let slow = MockStrategy::html(StrategyKind::StealthBrowser, article_html())
            .with_delay(Duration::from_secs(5))
            .with_timeout(Duration::from_millis(50));
        let chain = StrategyChain::with_strategies(vec![Arc::new(slow)]);

        let started = Instant::now();
        let outcome = chain.acquire("https://example.com/news").await;

        assert_eq!(outcome, AcquisitionOutcome::exhausted());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_extraction_counts_against_strategy_timeout() {
        let paragraphs: String = (0..40_000)
            .map(|i| format!("<p>Paragraph {}, with a comma, of a very long page.</p>", i))
            .collect();
        let huge = format!("<html><body><article>{}</article></body></html>", paragraphs);
        let slow = MockStrategy::html(StrategyKind::DirectFetch, huge)
            .with_timeout(Duration::from_millis(100));
        let chain = StrategyChain::with_strategies(vec![Arc::new(slow.clone())]);

        let started = Instant::now();
        let outcome = chain.acquire("https://example.com/news").await;

        assert_eq!(outcome, AcquisitionOutcome::exhausted());
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(slow.calls(), 1);
    }

    #[test]
    fn test_classify_text() {
        let extractor = ContentExtractor::new();
        let detector = PhraseBlockDetector::new();

        assert_eq!(
            classify_text(&extractor, &detector, "short"),
            Err(StrategyError::LowConfidenceExtraction)
        );
        assert_eq!(
            classify_text(
                &extractor,
                &detector,
                "Attention Required! | Cloudflare. Please complete the security check to access \
                 this website. Why do I have to complete a CAPTCHA? Ray ID: 7d1f."
            ),
            Err(StrategyError::BlockedContent)
        );
    }

    #[test]
    fn test_classify_markup() {
        let extractor = ContentExtractor::new();
        let detector = PhraseBlockDetector::new();

        assert_eq!(
            classify_markup(&extractor, &detector, CHALLENGE_HTML),
            Err(StrategyError::BlockedContent)
        );
        assert_eq!(
            classify_markup(&extractor, &detector, "<p>nothing here</p>"),
            Err(StrategyError::LowConfidenceExtraction)
        );
        assert!(classify_markup(&extractor, &detector, &article_html()).is_ok());
    }
}
