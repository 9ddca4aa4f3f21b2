//! Utility modules shared by strategies and the search provider.
//!
//! - [`HttpClient`]: shared HTTP client with browser-like defaults
//! - [`configure_builder`]: apply connection and proxy settings to any client builder
//! - [`RetryConfig`] / [`with_retry`]: exponential backoff for transient search errors
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use article_scout::search::SearchError;
//! use article_scout::utils::{with_retry, RetryConfig};
//!
//! # async fn fetch_results() -> Result<Vec<String>, SearchError> { Ok(vec![]) }
//! # #[tokio::main]
//! # async fn main() -> Result<(), SearchError> {
//! let config = RetryConfig::default().max_attempts(3);
//! let results = with_retry(config, || fetch_results()).await?;
//! # Ok(())
//! # }
//! ```

mod http;
mod retry;

pub use http::{browser_headers, configure_builder, HttpClient, BROWSER_USER_AGENT};
pub use retry::{search_retry_config, with_retry, RetryConfig, TransientError};
