//! Mock strategy for testing purposes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::models::{DocumentFormat, RawDocument, StrategyKind};
use crate::strategies::{Strategy, StrategyError};

#[derive(Debug, Clone)]
enum Behavior {
    Respond(DocumentFormat, String),
    Fail(StrategyError),
}

/// A strategy with a scripted result, an optional delay and a call counter
#[derive(Debug, Clone)]
pub struct MockStrategy {
    kind: StrategyKind,
    behavior: Behavior,
    delay: Option<Duration>,
    timeout: Duration,
    calls: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

/// Marks a fetch as finished when its future completes or is dropped
struct ReleaseGuard(Arc<AtomicUsize>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl MockStrategy {
    fn with_behavior(kind: StrategyKind, behavior: Behavior) -> Self {
        Self {
            kind,
            behavior,
            delay: None,
            timeout: Duration::from_secs(5),
            calls: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns `markup` as an HTML document
    pub fn html(kind: StrategyKind, markup: impl Into<String>) -> Self {
        Self::with_behavior(kind, Behavior::Respond(DocumentFormat::Html, markup.into()))
    }

    /// Returns `text` as already rendered prose
    pub fn text(kind: StrategyKind, text: impl Into<String>) -> Self {
        Self::with_behavior(kind, Behavior::Respond(DocumentFormat::Text, text.into()))
    }

    /// Fails every call with `error`
    pub fn failing(kind: StrategyKind, error: StrategyError) -> Self {
        Self::with_behavior(kind, Behavior::Fail(error))
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Number of `fetch` calls so far (shared between clones)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch` futures that completed or were dropped
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Strategy for MockStrategy {
    fn kind(&self) -> StrategyKind {
        self.kind
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, _url: &Url) -> Result<RawDocument, StrategyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _release = ReleaseGuard(Arc::clone(&self.released));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            Behavior::Respond(DocumentFormat::Html, body) => {
                Ok(RawDocument::html(body.clone(), self.kind, Some(200)))
            }
            Behavior::Respond(DocumentFormat::Text, body) => {
                Ok(RawDocument::text(body.clone(), self.kind, Some(200)))
            }
            Behavior::Fail(error) => Err(error.clone()),
        }
    }
}
