//! Configuration management.
//!
//! Every section has working defaults; a TOML file (see [`file_config`]) and
//! `ARTICLE_SCOUT_*` environment variables override them.

pub mod file_config;

pub use file_config::{find_config_file, ConfigFileError};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::{StrategyKind, MIN_CONTENT_CHARS};
use crate::utils::BROWSER_USER_AGENT;
use crate::verify::{DEFAULT_EXCLUDED_DOMAINS, DEFAULT_TRUSTED_DOMAINS};

/// Environment variable restricting the chain to the listed strategy ids
pub const ENABLED_STRATEGIES_VAR: &str = "ARTICLE_SCOUT_ENABLED_STRATEGIES";

/// Environment variable removing the listed strategy ids from the chain
pub const DISABLED_STRATEGIES_VAR: &str = "ARTICLE_SCOUT_DISABLED_STRATEGIES";

/// Environment variable naming the Chromium binary
pub const CHROMIUM_PATH_VAR: &str = "ARTICLE_SCOUT_CHROMIUM_PATH";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Strategy selection and time budgets
    #[serde(default)]
    pub strategies: StrategiesConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Outbound proxy
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Headless browser settings
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Third-party mirror and proxy services
    #[serde(default)]
    pub services: ServicesConfig,

    /// Block page detection
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Claim verification
    #[serde(default)]
    pub verifier: VerifierConfig,

    /// Web search provider
    #[serde(default)]
    pub search: SearchConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Strategy selection and per-strategy timeouts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategiesConfig {
    /// Comma-separated ids; when set, only these strategies run
    #[serde(default = "enabled_from_env")]
    pub enabled: Option<String>,

    /// Comma-separated ids that never run
    #[serde(default = "disabled_from_env")]
    pub disabled: Option<String>,

    /// Per-strategy timeouts
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
}

impl Default for StrategiesConfig {
    fn default() -> Self {
        Self {
            enabled: enabled_from_env(),
            disabled: disabled_from_env(),
            timeouts: TimeoutsConfig::default(),
        }
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn enabled_from_env() -> Option<String> {
    non_empty_env(ENABLED_STRATEGIES_VAR)
}

fn disabled_from_env() -> Option<String> {
    non_empty_env(DISABLED_STRATEGIES_VAR)
}

/// Time budget for each strategy, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    #[serde(default = "default_bypass_secs")]
    pub bypass_secs: u64,

    /// Includes the post-load settle delay
    #[serde(default = "default_browser_secs")]
    pub browser_secs: u64,

    #[serde(default = "default_archive_secs")]
    pub archive_secs: u64,

    #[serde(default = "default_reader_secs")]
    pub reader_secs: u64,

    #[serde(default = "default_direct_secs")]
    pub direct_secs: u64,

    #[serde(default = "default_cache_secs")]
    pub cache_secs: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            bypass_secs: default_bypass_secs(),
            browser_secs: default_browser_secs(),
            archive_secs: default_archive_secs(),
            reader_secs: default_reader_secs(),
            direct_secs: default_direct_secs(),
            cache_secs: default_cache_secs(),
        }
    }
}

impl TimeoutsConfig {
    /// Timeout for one strategy
    pub fn for_kind(&self, kind: StrategyKind) -> Duration {
        let secs = match kind {
            StrategyKind::DefenseBypass => self.bypass_secs,
            StrategyKind::StealthBrowser => self.browser_secs,
            StrategyKind::ArchiveMirror => self.archive_secs,
            StrategyKind::ReaderProxy => self.reader_secs,
            StrategyKind::DirectFetch => self.direct_secs,
            StrategyKind::CacheMirror => self.cache_secs,
        };
        Duration::from_secs(secs)
    }
}

fn default_bypass_secs() -> u64 {
    20
}

fn default_browser_secs() -> u64 {
    30
}

fn default_archive_secs() -> u64 {
    20
}

fn default_reader_secs() -> u64 {
    20
}

fn default_direct_secs() -> u64 {
    15
}

fn default_cache_secs() -> u64 {
    15
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User agent sent by HTTP strategies
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// TCP/TLS connect timeout
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

/// Proxy configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub http: Option<String>,

    #[serde(default)]
    pub https: Option<String>,

    #[serde(default)]
    pub no_proxy: Option<String>,
}

/// Headless browser settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Delay after navigation for dynamic content to render
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Chromium binary; auto-detected when unset
    #[serde(default = "executable_from_env")]
    pub executable: Option<PathBuf>,

    /// Run without a window
    #[serde(default = "default_true")]
    pub headless: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            executable: executable_from_env(),
            headless: true,
        }
    }
}

fn executable_from_env() -> Option<PathBuf> {
    non_empty_env(CHROMIUM_PATH_VAR).map(PathBuf::from)
}

fn default_settle_ms() -> u64 {
    2000
}

fn default_true() -> bool {
    true
}

/// Base URLs of the mirror and proxy services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// The target URL is appended after a slash
    #[serde(default = "default_archive_base")]
    pub archive_base: String,

    /// The target URL is appended after a slash
    #[serde(default = "default_reader_base")]
    pub reader_base: String,

    /// The target URL is appended to `cache:`
    #[serde(default = "default_cache_base")]
    pub cache_base: String,

    /// Optional reader proxy API key for higher rate limits
    #[serde(default = "reader_api_key_from_env")]
    pub reader_api_key: Option<String>,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            archive_base: default_archive_base(),
            reader_base: default_reader_base(),
            cache_base: default_cache_base(),
            reader_api_key: reader_api_key_from_env(),
        }
    }
}

fn default_archive_base() -> String {
    "https://web.archive.org/web".to_string()
}

fn default_reader_base() -> String {
    "https://r.jina.ai".to_string()
}

fn default_cache_base() -> String {
    "https://webcache.googleusercontent.com/search".to_string()
}

fn reader_api_key_from_env() -> Option<String> {
    non_empty_env("JINA_API_KEY")
}

/// Block page detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Phrases added to the built-in challenge page list
    #[serde(default)]
    pub extra_phrases: Vec<String>,

    /// Extracted text must be longer than this many characters
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            extra_phrases: Vec::new(),
            min_content_chars: default_min_content_chars(),
        }
    }
}

fn default_min_content_chars() -> usize {
    MIN_CONTENT_CHARS
}

/// Claim verification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Domains presumed authoritative for fact-checking
    #[serde(default = "default_trusted_domains")]
    pub trusted_domains: Vec<String>,

    /// Low-quality aggregators excluded from free-text queries
    #[serde(default = "default_excluded_domains")]
    pub excluded_domains: Vec<String>,

    /// Results requested per query
    #[serde(default = "default_results_per_query")]
    pub results_per_query: usize,

    /// Cap on deep-fetched evidence, in characters
    #[serde(default = "default_evidence_chars")]
    pub evidence_chars: usize,

    /// Sources returned when the caller does not say
    #[serde(default = "default_max_sources")]
    pub default_max_sources: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            trusted_domains: default_trusted_domains(),
            excluded_domains: default_excluded_domains(),
            results_per_query: default_results_per_query(),
            evidence_chars: default_evidence_chars(),
            default_max_sources: default_max_sources(),
        }
    }
}

fn default_trusted_domains() -> Vec<String> {
    DEFAULT_TRUSTED_DOMAINS.iter().map(|d| d.to_string()).collect()
}

fn default_excluded_domains() -> Vec<String> {
    DEFAULT_EXCLUDED_DOMAINS.iter().map(|d| d.to_string()).collect()
}

fn default_results_per_query() -> usize {
    3
}

fn default_evidence_chars() -> usize {
    6000
}

fn default_max_sources() -> usize {
    5
}

/// Web search provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// HTML endpoint of the search engine
    #[serde(default = "default_search_base")]
    pub base_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_base(),
        }
    }
}

fn default_search_base() -> String {
    "https://html.duckduckgo.com/html/".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "json" for structured output, plain text otherwise
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Defaults with nothing taken from the environment, for writing to disk.
    ///
    /// Secrets and per-shell choices stay out of the file; they are still read
    /// from the environment when the file is loaded.
    pub fn file_template() -> Self {
        let mut config = Self::default();
        config.strategies.enabled = None;
        config.strategies.disabled = None;
        config.browser.executable = None;
        config.services.reader_api_key = None;
        config
    }
}

/// Load configuration from a file, with `ARTICLE_SCOUT_*` environment overrides
///
/// Nested keys use a double underscore, e.g. `ARTICLE_SCOUT_BROWSER__SETTLE_MS=3000`.
pub fn load_config(path: &PathBuf) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path.as_path()))
        .add_source(
            config::Environment::with_prefix("ARTICLE_SCOUT")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize()
}

/// Get the default configuration (from env vars or defaults)
pub fn get_config() -> Config {
    Config::default()
}
