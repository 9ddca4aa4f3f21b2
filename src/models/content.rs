//! Acquisition models: requests, raw documents, extracted content and outcomes.

use serde::{Deserialize, Serialize};
use url::Url;

/// Minimum number of characters extracted text must exceed to count as content
pub const MIN_CONTENT_CHARS: usize = 100;

/// The strategy that produced a document
///
/// Doubles as the provenance tag carried by [`ExtractedContent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    DefenseBypass,
    StealthBrowser,
    ArchiveMirror,
    ReaderProxy,
    DirectFetch,
    CacheMirror,
}

impl StrategyKind {
    /// All strategies in chain priority order
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::DefenseBypass,
        StrategyKind::StealthBrowser,
        StrategyKind::ArchiveMirror,
        StrategyKind::ReaderProxy,
        StrategyKind::DirectFetch,
        StrategyKind::CacheMirror,
    ];

    /// Returns the display name of the strategy
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::DefenseBypass => "Defense bypass client",
            StrategyKind::StealthBrowser => "Stealth browser",
            StrategyKind::ArchiveMirror => "Archive mirror",
            StrategyKind::ReaderProxy => "Reader proxy",
            StrategyKind::DirectFetch => "Direct fetch",
            StrategyKind::CacheMirror => "Cache mirror",
        }
    }

    /// Returns the strategy identifier (used in configuration)
    pub fn id(&self) -> &'static str {
        match self {
            StrategyKind::DefenseBypass => "bypass",
            StrategyKind::StealthBrowser => "browser",
            StrategyKind::ArchiveMirror => "archive",
            StrategyKind::ReaderProxy => "reader",
            StrategyKind::DirectFetch => "direct",
            StrategyKind::CacheMirror => "cache",
        }
    }

    /// Look up a strategy by its identifier (case-insensitive)
    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.id().eq_ignore_ascii_case(id))
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A validated request to acquire one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalRequest {
    url: Url,
}

impl RetrievalRequest {
    /// Parse a target URL. Only absolute http(s) URLs are accepted.
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(raw.trim())?;
        match url.scheme() {
            "http" | "https" if url.has_host() => Ok(Self { url }),
            _ => Err(url::ParseError::RelativeUrlWithoutBase),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// How the body of a [`RawDocument`] should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// HTML markup that still needs content extraction
    Html,
    /// Prose already rendered by the strategy (e.g. a reader proxy)
    Text,
}

/// A page as fetched by a single strategy
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Page body
    pub body: String,

    /// Strategy that fetched the page
    pub strategy: StrategyKind,

    /// HTTP status code, when the strategy talks HTTP directly
    pub status: Option<u16>,

    /// Interpretation of `body`
    pub format: DocumentFormat,
}

impl RawDocument {
    /// HTML markup fetched over HTTP
    pub fn html(body: impl Into<String>, strategy: StrategyKind, status: Option<u16>) -> Self {
        Self {
            body: body.into(),
            strategy,
            status,
            format: DocumentFormat::Html,
        }
    }

    /// Already extracted prose
    pub fn text(body: impl Into<String>, strategy: StrategyKind, status: Option<u16>) -> Self {
        Self {
            body: body.into(),
            strategy,
            status,
            format: DocumentFormat::Text,
        }
    }
}

/// Clean article text that cleared both the length gate and block detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedContent {
    /// Normalized prose (lightweight markdown)
    pub text: String,

    /// Length of `text` in characters
    pub length: usize,

    /// Strategy that produced the text
    pub provenance: StrategyKind,
}

impl ExtractedContent {
    pub(crate) fn new(text: String, provenance: StrategyKind) -> Self {
        let length = text.chars().count();
        Self {
            text,
            length,
            provenance,
        }
    }
}

/// Why an acquisition failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Every strategy in the chain failed
    Exhausted,
    /// The input was not a well-formed absolute http(s) URL
    InvalidUrl,
}

/// Result of acquiring one URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AcquisitionOutcome {
    Success(ExtractedContent),
    Failure { kind: FailureKind, message: String },
}

impl AcquisitionOutcome {
    pub(crate) fn exhausted() -> Self {
        AcquisitionOutcome::Failure {
            kind: FailureKind::Exhausted,
            message: "unable to retrieve content".to_string(),
        }
    }

    pub(crate) fn invalid_url(err: url::ParseError) -> Self {
        AcquisitionOutcome::Failure {
            kind: FailureKind::InvalidUrl,
            message: format!("invalid URL: {}", err),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AcquisitionOutcome::Success(_))
    }

    /// The extracted content, if acquisition succeeded
    pub fn content(&self) -> Option<&ExtractedContent> {
        match self {
            AcquisitionOutcome::Success(content) => Some(content),
            AcquisitionOutcome::Failure { .. } => None,
        }
    }

    /// Consume the outcome, keeping only the text on success
    pub fn into_text(self) -> Option<String> {
        match self {
            AcquisitionOutcome::Success(content) => Some(content.text),
            AcquisitionOutcome::Failure { .. } => None,
        }
    }

    /// Text suitable for showing to an end user.
    ///
    /// Failures never expose protocol details, only a pointer to open the page manually.
    pub fn user_message(&self, url: &str) -> String {
        match self {
            AcquisitionOutcome::Success(content) => content.text.clone(),
            AcquisitionOutcome::Failure {
                kind: FailureKind::InvalidUrl,
                ..
            } => format!("Not a valid web address: {}", url),
            AcquisitionOutcome::Failure { .. } => format!(
                "Unable to retrieve content. Try opening this URL directly: {}",
                url
            ),
        }
    }
}
