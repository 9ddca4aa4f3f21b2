//! Trusted fact-checking and news domains.

use url::Url;

/// Fact-checkers and wire/news outlets treated as authoritative by default
pub const DEFAULT_TRUSTED_DOMAINS: &[&str] = &[
    "snopes.com",
    "factcheck.org",
    "politifact.com",
    "reuters.com",
    "apnews.com",
    "fullfact.org",
    "bbc.com",
    "bbc.co.uk",
    "afp.com",
    "npr.org",
    "washingtonpost.com",
    "nytimes.com",
    "theguardian.com",
    "usatoday.com",
    "leadstories.com",
    "checkyourfact.com",
];

/// Aggregators whose copies crowd out primary reporting in search results
pub const DEFAULT_EXCLUDED_DOMAINS: &[&str] = &["msn.com"];

#[derive(Debug, Clone, PartialEq, Eq)]
struct TrustedEntry {
    host: String,
    path_prefix: Option<String>,
}

impl TrustedEntry {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().trim_start_matches("https://").trim_start_matches("http://");
        let raw = raw.trim_end_matches('/');
        let (host, path) = match raw.split_once('/') {
            Some((host, path)) => (host, Some(format!("/{}", path))),
            None => (raw, None),
        };
        let host = strip_www(&host.to_lowercase()).to_string();
        if host.is_empty() {
            return None;
        }
        Some(Self {
            host,
            path_prefix: path,
        })
    }

    fn matches(&self, host: &str, path: &str) -> bool {
        let host_ok = host == self.host || host.ends_with(&format!(".{}", self.host));
        host_ok
            && self
                .path_prefix
                .as_deref()
                .map_or(true, |prefix| path.starts_with(prefix))
    }

    fn as_site(&self) -> String {
        match &self.path_prefix {
            Some(path) => format!("{}{}", self.host, path),
            None => self.host.clone(),
        }
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// An immutable set of trusted domains.
///
/// Entries are bare hosts (`snopes.com`, which also covers subdomains) or a
/// host with a path (`reuters.com/fact-check`, which covers only that section).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedDomains {
    entries: Vec<TrustedEntry>,
}

impl TrustedDomains {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<TrustedEntry> = Vec::new();
        for entry in domains
            .into_iter()
            .filter_map(|d| TrustedEntry::parse(d.as_ref()))
        {
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }
        Self { entries }
    }

    /// Whether `url` belongs to a trusted domain. Unparseable URLs are untrusted.
    pub fn is_trusted(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url.trim()) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host = host.to_lowercase();
        let host = strip_www(&host);

        self.entries
            .iter()
            .any(|entry| entry.matches(host, parsed.path()))
    }

    /// Entries in `site:` form, in configured order
    pub fn sites(&self) -> Vec<String> {
        self.entries.iter().map(TrustedEntry::as_site).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TrustedDomains {
    fn default() -> Self {
        Self::new(DEFAULT_TRUSTED_DOMAINS)
    }
}
