//! # Article Scout
//!
//! Resilient article acquisition: an ordered chain of retrieval strategies
//! that gets the readable text of a web page past bot walls, paywalls and
//! JavaScript-only rendering, plus evidence gathering for factual claims.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (AcquisitionOutcome, CandidateSource, etc.)
//! - [`strategies`]: Retrieval strategies and the chain that runs them in order
//! - [`extract`]: Article text extraction and block page detection
//! - [`search`]: Web search providers used by the verifier
//! - [`verify`]: Claim verification (query variants, trust ranking, deep-fetch)
//! - [`utils`]: HTTP client and retry helpers
//! - [`config`]: Configuration management
//! - [`ui`]: Terminal output for the command-line harness
//!
//! ## Example
//!
//! ```rust,no_run
//! use article_scout::StrategyChain;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let chain = StrategyChain::new()?;
//! let url = "https://example.com/news/story";
//! let outcome = chain.acquire(url).await;
//! println!("{}", outcome.user_message(url));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod extract;
pub mod models;
pub mod search;
pub mod strategies;
pub mod ui;
pub mod utils;
pub mod verify;

// Re-export commonly used types
pub use models::{AcquisitionOutcome, ClaimVerificationResult, ExtractedContent, StrategyKind};
pub use strategies::{Strategy, StrategyChain};
pub use verify::ClaimVerifier;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
