//! Claim verification models.

use serde::{Deserialize, Serialize};

/// A search hit considered as evidence for or against a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSource {
    /// Result title
    pub title: String,

    /// Result URL
    pub url: String,

    /// Short excerpt shown by the search engine
    pub snippet: String,

    /// Whether the URL belongs to a trusted fact-checking or news domain
    #[serde(default)]
    pub trusted: bool,
}

impl CandidateSource {
    /// Create an untrusted candidate (trust is decided by the verifier)
    pub fn new(title: impl Into<String>, url: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            trusted: false,
        }
    }
}

/// Evidence gathered for one claim
///
/// Built once by the verifier and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimVerificationResult {
    /// The claim as given by the caller
    pub claim: String,

    /// Sources, trusted ones first
    pub sources: Vec<CandidateSource>,

    /// Number of entries in `sources`
    pub source_count: usize,

    /// Deep-fetched text of the top trusted source, capped in length
    pub best_evidence: Option<String>,
}

impl ClaimVerificationResult {
    pub fn new(
        claim: impl Into<String>,
        sources: Vec<CandidateSource>,
        best_evidence: Option<String>,
    ) -> Self {
        let source_count = sources.len();
        Self {
            claim: claim.into(),
            sources,
            source_count,
            best_evidence,
        }
    }

    /// A result with no sources and no evidence
    pub fn empty(claim: impl Into<String>) -> Self {
        Self::new(claim, Vec::new(), None)
    }

    /// Trusted sources only
    pub fn trusted_sources(&self) -> impl Iterator<Item = &CandidateSource> {
        self.sources.iter().filter(|s| s.trusted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_count_matches_sources() {
        let result = ClaimVerificationResult::new(
            "water is wet",
            vec![
                CandidateSource::new("a", "https://a.example", ""),
                CandidateSource::new("b", "https://b.example", ""),
            ],
            None,
        );
        assert_eq!(result.source_count, 2);
        assert_eq!(result.trusted_sources().count(), 0);
    }

    #[test]
    fn test_trusted_defaults_to_false_when_missing() {
        let source: CandidateSource =
            serde_json::from_str(r#"{"title":"t","url":"https://x.example","snippet":"s"}"#)
                .unwrap();
        assert!(!source.trusted);
    }
}
