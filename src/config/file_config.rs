//! Configuration file support for article-scout.
//!
//! This module provides TOML configuration file parsing and discovery.
//!
//! # Configuration File Format
//!
//! ```toml
//! [strategies]
//! enabled = "bypass,archive,reader,direct"
//! disabled = "cache"
//!
//! [strategies.timeouts]
//! bypass_secs = 20
//! browser_secs = 30
//! direct_secs = 15
//!
//! [http]
//! connect_timeout_secs = 10
//!
//! [proxy]
//! http = "http://proxy:8080"
//! https = "https://proxy:8080"
//! no_proxy = "localhost,127.0.0.1"
//!
//! [browser]
//! settle_ms = 2000
//! executable = "/usr/bin/chromium"
//!
//! [services]
//! reader_api_key = "your-key"
//!
//! [detection]
//! extra_phrases = ["verify you are human"]
//! min_content_chars = 100
//!
//! [verifier]
//! trusted_domains = ["snopes.com", "reuters.com/fact-check"]
//! excluded_domains = ["msn.com"]
//! results_per_query = 3
//! evidence_chars = 6000
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

use std::path::{Path, PathBuf};

use super::Config;

/// File name looked up by [`find_config_file`]
pub const CONFIG_FILE_NAME: &str = "article-scout.toml";

/// Load configuration from a TOML file (no environment overrides)
pub fn load_file(path: &Path) -> Result<Config, ConfigFileError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io(e.to_string()))?;

    toml::from_str(&content).map_err(|e| ConfigFileError::Parse(e.to_string()))
}

/// Save configuration to a TOML file
pub fn save_file(config: &Config, path: &Path) -> Result<(), ConfigFileError> {
    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
}

/// Locate a configuration file.
///
/// Checks the working directory first, then the platform config directory
/// (`~/.config/article-scout/article-scout.toml` on Linux).
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    let user = dirs::config_dir()?.join("article-scout").join(CONFIG_FILE_NAME);
    user.is_file().then_some(user)
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}
