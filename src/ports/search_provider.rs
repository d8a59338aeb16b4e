//! Web search port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for keyword web search.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns at most `max_results` hits, best first.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError>;
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl SearchHit {
    pub fn new(title: impl Into<String>, url: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

/// Search errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("search timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("unexpected status {status}")]
    Status { status: u16 },

    #[error("parse error: {0}")]
    Parse(String),
}
