//! DuckDuckGo HTML search provider.
//!
//! DuckDuckGo has no official web search API; this provider reads the
//! JavaScript-free HTML endpoint. Throttling shows up as HTTP 202 or 429 and is
//! retried with backoff.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use url::Url;

use crate::config::SearchConfig;
use crate::models::CandidateSource;
use crate::search::{SearchError, SearchProvider};
use crate::utils::{search_retry_config, with_retry, HttpClient, RetryConfig};

/// DuckDuckGo web search
#[derive(Debug, Clone)]
pub struct DuckDuckGoSearch {
    client: Arc<HttpClient>,
    base_url: String,
    retry: RetryConfig,
}

impl DuckDuckGoSearch {
    pub fn with_client(client: Arc<HttpClient>, search: &SearchConfig) -> Self {
        Self {
            client,
            base_url: search.base_url.clone(),
            retry: search_retry_config(),
        }
    }

    /// Override the retry policy
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn fetch_page(&self, query: &str) -> Result<String, SearchError> {
        let client = Arc::clone(&self.client);
        let base_url = self.base_url.clone();
        let query = query.to_string();

        with_retry(self.retry, || {
            let client = Arc::clone(&client);
            let base_url = base_url.clone();
            let query = query.clone();
            async move {
                let response = client
                    .get(&base_url)
                    .query(&[("q", query.as_str())])
                    .send()
                    .await?;

                let status = response.status();
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS
                    || status == reqwest::StatusCode::ACCEPTED
                {
                    return Err(SearchError::RateLimit);
                }
                if !status.is_success() {
                    return Err(SearchError::Http(status.as_u16()));
                }

                response
                    .text()
                    .await
                    .map_err(|e| SearchError::Network(format!("Failed to read response: {}", e)))
            }
        })
        .await
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<CandidateSource>, SearchError> {
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let html = self.fetch_page(query).await?;
        let results = parse_results(&html, max_results)?;
        tracing::debug!("DuckDuckGo returned {} results for {:?}", results.len(), query);
        Ok(results)
    }
}

/// Parse result blocks out of a DuckDuckGo HTML page
pub(crate) fn parse_results(
    html: &str,
    max_results: usize,
) -> Result<Vec<CandidateSource>, SearchError> {
    let document = Html::parse_document(html);
    let result_selector = Selector::parse("div.result")
        .map_err(|e| SearchError::Parse(format!("Bad selector: {}", e)))?;
    let link_selector = Selector::parse("a.result__a")
        .map_err(|e| SearchError::Parse(format!("Bad selector: {}", e)))?;
    let snippet_selector = Selector::parse(".result__snippet")
        .map_err(|e| SearchError::Parse(format!("Bad selector: {}", e)))?;

    let mut results = Vec::new();
    for block in document.select(&result_selector) {
        if results.len() >= max_results {
            break;
        }
        if is_ad(&block) {
            continue;
        }

        let Some(link) = block.select(&link_selector).next() else {
            continue;
        };
        let Some(url) = link.value().attr("href").and_then(resolve_href) else {
            continue;
        };

        let title = squash(&link.text().collect::<String>());
        let snippet = block
            .select(&snippet_selector)
            .next()
            .map(|s| squash(&s.text().collect::<String>()))
            .unwrap_or_default();

        results.push(CandidateSource::new(title, url, snippet));
    }

    Ok(results)
}

fn is_ad(block: &ElementRef<'_>) -> bool {
    block
        .value()
        .classes()
        .any(|class| class == "result--ad" || class == "result--ad--small")
}

/// Unwrap DuckDuckGo's `/l/?uddg=` redirect links into the target URL
fn resolve_href(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{}", href)
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&absolute).ok()?;
    if parsed.path().starts_with("/l/") {
        let target = parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())?;
        return Url::parse(&target).ok().map(String::from);
    }

    match parsed.scheme() {
        "http" | "https" => Some(parsed.into()),
        _ => None,
    }
}

fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r##"
        <html><body>
          <div class="result results_links result--ad">
            <a class="result__a" href="https://ads.example.com/buy">Buy now</a>
          </div>
          <div class="result results_links web-result">
            <h2 class="result__title">
              <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.snopes.com%2Ffact-check%2Fmoon%2F&amp;rut=abc">Is the moon
                 made of cheese?</a>
            </h2>
            <a class="result__snippet" href="#">No, the <b>moon</b> is rock.</a>
          </div>
          <div class="result results_links web-result">
            <a class="result__a" href="https://example.org/story">Example story</a>
          </div>
          <div class="result results_links web-result">
            <a class="result__a" href="javascript:void(0)">Broken</a>
          </div>
        </body></html>
    "##;

    #[test]
    fn test_parse_results() {
        let results = parse_results(RESULTS_PAGE, 10).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Is the moon made of cheese?");
        assert_eq!(results[0].url, "https://www.snopes.com/fact-check/moon/");
        assert_eq!(results[0].snippet, "No, the moon is rock.");
        assert!(!results[0].trusted);
        assert_eq!(results[1].url, "https://example.org/story");
        assert_eq!(results[1].snippet, "");
    }

    #[test]
    fn test_parse_results_respects_limit() {
        let results = parse_results(RESULTS_PAGE, 1).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_resolve_href() {
        assert_eq!(
            resolve_href("/l/?uddg=https%3A%2F%2Fapnews.com%2Fa"),
            Some("https://apnews.com/a".to_string())
        );
        assert_eq!(resolve_href("mailto:x@example.com"), None);
    }

    #[tokio::test]
    async fn test_search_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/html/")
            .match_query(mockito::Matcher::UrlEncoded("q".into(), "moon cheese".into()))
            .with_status(200)
            .with_body(RESULTS_PAGE)
            .create_async()
            .await;

        let search = DuckDuckGoSearch::with_client(
            Arc::new(HttpClient::new().unwrap()),
            &SearchConfig {
                base_url: format!("{}/html/", server.url()),
            },
        );

        let results = search.search("moon cheese", 3).await.unwrap();
        assert_eq!(results.len(), 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/html/")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let search = DuckDuckGoSearch::with_client(
            Arc::new(HttpClient::new().unwrap()),
            &SearchConfig {
                base_url: format!("{}/html/", server.url()),
            },
        )
        .with_retry_config(RetryConfig {
            max_attempts: 2,
            initial_delay: std::time::Duration::from_millis(1),
            max_delay: std::time::Duration::from_millis(2),
            backoff_multiplier: 2.0,
            attempt_timeout: std::time::Duration::from_secs(5),
        });

        let result = search.search("anything", 3).await;
        assert_eq!(result, Err(SearchError::RateLimit));
    }
}
