//! In-memory search provider for tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::ports::{SearchError, SearchHit, SearchProvider};

/// Returns the same hits for every query, or fails when configured to.
#[derive(Debug, Clone, Default)]
pub struct MockSearchProvider {
    hits: Vec<SearchHit>,
    fail: bool,
    queries: Arc<Mutex<Vec<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockSearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hit(mut self, title: &str, url: &str, snippet: &str) -> Self {
        self.hits.push(SearchHit::new(title, url, snippet));
        self
    }

    /// Every search returns a network error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Queries received so far.
    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        lock(&self.queries).push(query.to_string());
        if self.fail {
            return Err(SearchError::Network("mock search offline".to_string()));
        }
        Ok(self.hits.iter().take(max_results).cloned().collect())
    }
}
