//! Classification of extracted text as real content or an anti-automation page.

/// Text shorter than this many characters is suspect when it mentions a block phrase
pub const SHORT_TEXT_CHARS: usize = 500;

/// Phrases that, in short text, indicate a challenge or denial page
pub const DEFAULT_BLOCK_PHRASES: &[&str] = &[
    "cloudflare",
    "attention required",
    "access denied",
    "security service",
    "challenge-platform",
    "enable cookies",
    "captcha",
    "human verification",
    "ray id",
    "just a moment",
    "checking your browser",
    "ddos protection",
    "perimeterx",
    "datadome",
    "incapsula",
];

/// Phrases that indicate a security interstitial at any length
pub const DEFAULT_INTERSTITIAL_PHRASES: &[&str] =
    &["security service to protect itself from online attacks"];

/// Decides whether extracted text is a challenge/denial page.
///
/// Implementations are heuristics and should lean towards false negatives:
/// rejecting a genuine short article costs more than letting a block page through.
pub trait BlockDetector: Send + Sync + std::fmt::Debug {
    fn is_blocked(&self, text: &str) -> bool;
}

/// Phrase-list detector
#[derive(Debug, Clone)]
pub struct PhraseBlockDetector {
    phrases: Vec<String>,
    interstitial_phrases: Vec<String>,
    short_text_chars: usize,
}

impl PhraseBlockDetector {
    pub fn new() -> Self {
        Self {
            phrases: DEFAULT_BLOCK_PHRASES.iter().map(|p| p.to_string()).collect(),
            interstitial_phrases: DEFAULT_INTERSTITIAL_PHRASES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            short_text_chars: SHORT_TEXT_CHARS,
        }
    }

    /// Add phrases to the short-text list
    pub fn with_extra_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.phrases.extend(
            phrases
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty()),
        );
        self
    }

    /// Replace the short-text phrase list entirely
    pub fn with_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.phrases.clear();
        self.with_extra_phrases(phrases)
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

impl Default for PhraseBlockDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockDetector for PhraseBlockDetector {
    fn is_blocked(&self, text: &str) -> bool {
        let lower = text.to_lowercase();

        if text.chars().count() < self.short_text_chars
            && self.phrases.iter().any(|p| lower.contains(p.as_str()))
        {
            return true;
        }

        // Extraction sometimes keeps only the interstitial's explanation
        self.interstitial_phrases
            .iter()
            .any(|p| lower.contains(p.as_str()))
    }
}
