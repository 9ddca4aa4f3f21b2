//! Claim verification: gathering evidence for a factual claim.
//!
//! The verifier searches with several adversarial phrasings, merges the hits,
//! ranks trusted fact-checkers first and deep-fetches the top trusted source
//! through the [`StrategyChain`]. It gathers evidence; it does not judge.
//!
//! # Example
//!
//! ```rust,no_run
//! use article_scout::config::Config;
//! use article_scout::verify::ClaimVerifier;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let verifier = ClaimVerifier::from_config(&Config::default())?;
//! let result = verifier.verify("The Great Wall is visible from space", 5).await;
//! for source in &result.sources {
//!     println!("[{}] {}", if source.trusted { "trusted" } else { "other" }, source.url);
//! }
//! # Ok(())
//! # }
//! ```

mod queries;
mod trust;

pub use queries::build_queries;
pub use trust::{TrustedDomains, DEFAULT_EXCLUDED_DOMAINS, DEFAULT_TRUSTED_DOMAINS};

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::{Config, VerifierConfig};
use crate::models::{CandidateSource, ClaimVerificationResult};
use crate::search::{DuckDuckGoSearch, SearchProvider};
use crate::strategies::StrategyChain;
use crate::utils::HttpClient;

/// Gathers candidate sources and evidence for claims
#[derive(Debug, Clone)]
pub struct ClaimVerifier {
    search: Arc<dyn SearchProvider>,
    chain: Arc<StrategyChain>,
    trust: TrustedDomains,
    settings: VerifierConfig,
}

impl ClaimVerifier {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        chain: Arc<StrategyChain>,
        settings: VerifierConfig,
    ) -> Self {
        let trust = TrustedDomains::new(&settings.trusted_domains);
        Self {
            search,
            chain,
            trust,
            settings,
        }
    }

    /// DuckDuckGo search plus the configured strategy chain
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Arc::new(HttpClient::from_config(&config.http, &config.proxy)?);
        let search = DuckDuckGoSearch::with_client(client, &config.search);
        let chain = StrategyChain::from_config(config)?;
        Ok(Self::new(
            Arc::new(search),
            Arc::new(chain),
            config.verifier.clone(),
        ))
    }

    /// Replace the trusted domain set
    pub fn with_trusted_domains(mut self, trust: TrustedDomains) -> Self {
        self.trust = trust;
        self
    }

    pub fn trusted_domains(&self) -> &TrustedDomains {
        &self.trust
    }

    /// [`verify`](Self::verify) with the configured default source count
    pub async fn verify_default(&self, claim: &str) -> ClaimVerificationResult {
        self.verify(claim, self.settings.default_max_sources).await
    }

    /// Collect up to `max_sources` sources for `claim`, trusted ones first.
    ///
    /// Search failures are logged and skipped; the result may be empty but
    /// this never fails.
    pub async fn verify(&self, claim: &str, max_sources: usize) -> ClaimVerificationResult {
        let queries = build_queries(claim, &self.trust, &self.settings.excluded_domains);
        if queries.is_empty() || max_sources == 0 {
            return ClaimVerificationResult::empty(claim);
        }

        // Sequential on purpose: search engines throttle bursts
        let mut hits = Vec::new();
        for query in &queries {
            match self
                .search
                .search(query, self.settings.results_per_query)
                .await
            {
                Ok(results) => {
                    tracing::debug!("{} results for {:?}", results.len(), query);
                    hits.extend(results);
                }
                Err(e) => tracing::warn!("Search failed for {:?}: {}", query, e),
            }
        }

        let sources = self.rank(hits, max_sources);
        let best_evidence = self.deep_fetch(&sources).await;

        tracing::info!(
            sources = sources.len(),
            trusted = sources.iter().filter(|s| s.trusted).count(),
            evidence = best_evidence.is_some(),
            "Verified claim {:?}",
            claim
        );
        ClaimVerificationResult::new(claim, sources, best_evidence)
    }

    /// Dedup by URL, mark trust, put trusted first and truncate
    fn rank(&self, hits: Vec<CandidateSource>, max_sources: usize) -> Vec<CandidateSource> {
        let mut seen = HashSet::new();
        let unique = hits.into_iter().filter_map(|mut hit| {
            hit.url = hit.url.trim().to_string();
            if hit.url.is_empty() || !seen.insert(hit.url.clone()) {
                return None;
            }
            hit.trusted = self.trust.is_trusted(&hit.url);
            Some(hit)
        });

        let (trusted, other): (Vec<_>, Vec<_>) = unique.partition(|hit| hit.trusted);
        trusted
            .into_iter()
            .chain(other)
            .take(max_sources)
            .collect()
    }

    /// Fetch the first trusted source, capped to the evidence budget
    async fn deep_fetch(&self, sources: &[CandidateSource]) -> Option<String> {
        let top = sources.iter().find(|s| s.trusted)?;
        tracing::debug!("Deep-fetching {}", top.url);

        let text = self.chain.acquire(&top.url).await.into_text()?;
        Some(text.chars().take(self.settings.evidence_chars).collect())
    }
}
