//! Mock search provider for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::CandidateSource;
use crate::search::{SearchError, SearchProvider};

/// A search provider that returns scripted results and records queries.
///
/// Results are matched by substring: the first registered pattern contained in
/// the query wins; otherwise the default results are returned.
#[derive(Debug, Default)]
pub struct MockSearchProvider {
    scripted: Mutex<Vec<(String, Vec<CandidateSource>)>>,
    default_results: Mutex<Vec<CandidateSource>>,
    failures: Mutex<HashMap<String, SearchError>>,
    fail_all: Mutex<Option<SearchError>>,
    queries: Mutex<Vec<String>>,
}

impl MockSearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Results for any query containing `pattern`
    pub fn on_query(&self, pattern: impl Into<String>, results: Vec<CandidateSource>) {
        let mut guard = self.scripted.lock().unwrap();
        guard.push((pattern.into(), results));
    }

    /// Results for queries that match no pattern
    pub fn set_default_results(&self, results: Vec<CandidateSource>) {
        let mut guard = self.default_results.lock().unwrap();
        *guard = results;
    }

    /// Fail any query containing `pattern`
    pub fn fail_on(&self, pattern: impl Into<String>, error: SearchError) {
        let mut guard = self.failures.lock().unwrap();
        guard.insert(pattern.into(), error);
    }

    /// Fail every query
    pub fn fail_all(&self, error: SearchError) {
        let mut guard = self.fail_all.lock().unwrap();
        *guard = Some(error);
    }

    /// Queries received so far, in order
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<CandidateSource>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());

        if let Some(error) = self.fail_all.lock().unwrap().clone() {
            return Err(error);
        }
        if let Some(error) = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .find(|(pattern, _)| query.contains(pattern.as_str()))
            .map(|(_, error)| error.clone())
        {
            return Err(error);
        }

        let scripted = self.scripted.lock().unwrap();
        let results = scripted
            .iter()
            .find(|(pattern, _)| query.contains(pattern.as_str()))
            .map(|(_, results)| results.clone())
            .unwrap_or_else(|| self.default_results.lock().unwrap().clone());

        Ok(results.into_iter().take(max_results).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_and_default_results() {
        let mock = MockSearchProvider::new();
        mock.on_query("debunked", vec![CandidateSource::new("a", "https://a.example", "")]);
        mock.set_default_results(vec![
            CandidateSource::new("b", "https://b.example", ""),
            CandidateSource::new("c", "https://c.example", ""),
        ]);

        let hits = mock.search("claim debunked", 3).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "a");

        let hits = mock.search("claim fact check", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "b");

        assert_eq!(mock.queries(), vec!["claim debunked", "claim fact check"]);
    }

    #[test]
    fn test_result_limit_without_async_test() {
        let mock = MockSearchProvider::new();
        mock.set_default_results(vec![
            CandidateSource::new("a", "https://a.example", ""),
            CandidateSource::new("b", "https://b.example", ""),
        ]);
        let hits = tokio_test::block_on(mock.search("anything", 0)).unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_failures() {
        let mock = MockSearchProvider::new();
        mock.fail_on("site:", SearchError::RateLimit);
        assert_eq!(
            mock.search("x site:snopes.com", 3).await,
            Err(SearchError::RateLimit)
        );
        assert!(mock.search("x", 3).await.is_ok());

        mock.fail_all(SearchError::Timeout);
        assert_eq!(mock.search("x", 3).await, Err(SearchError::Timeout));
    }
}
