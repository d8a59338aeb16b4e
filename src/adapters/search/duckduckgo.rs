//! DuckDuckGo Instant Answer search adapter.
//!
//! Queries `https://api.duckduckgo.com/?format=json` and flattens the abstract,
//! the direct results and the (possibly nested) related topics into hits.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::ports::{SearchError, SearchHit, SearchProvider};

pub const DEFAULT_ENDPOINT: &str = "https://api.duckduckgo.com/";

/// Configuration for [`DuckDuckGoSearch`].
#[derive(Debug, Clone)]
pub struct DuckDuckGoConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for DuckDuckGoConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(8),
            user_agent: "Mozilla/5.0 (order-copilot)".to_string(),
        }
    }
}

impl DuckDuckGoConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Web search backed by the DuckDuckGo JSON API.
pub struct DuckDuckGoSearch {
    config: DuckDuckGoConfig,
    client: Client,
}

impl DuckDuckGoSearch {
    pub fn new(config: DuckDuckGoConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SearchError::Network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else {
                    SearchError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;
        let answer: InstantAnswer =
            serde_json::from_str(&body).map_err(|e| SearchError::Parse(e.to_string()))?;

        let hits = answer.into_hits(max_results);
        debug!(query, hits = hits.len(), "duckduckgo search");
        Ok(hits)
    }
}

// ----- DuckDuckGo API Types -----

#[derive(Debug, Default, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "Heading", default)]
    heading: String,
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(rename = "Results", default)]
    results: Vec<Topic>,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<Topic>,
}

#[derive(Debug, Default, Deserialize)]
struct Topic {
    #[serde(rename = "Text", default)]
    text: String,
    #[serde(rename = "FirstURL", default)]
    first_url: String,
    #[serde(rename = "Topics", default)]
    topics: Vec<Topic>,
}

impl InstantAnswer {
    fn into_hits(self, max_results: usize) -> Vec<SearchHit> {
        let mut hits = Vec::new();
        if !self.abstract_text.is_empty() && !self.abstract_url.is_empty() {
            let title = if self.heading.is_empty() {
                self.abstract_url.clone()
            } else {
                clean_text(&self.heading)
            };
            hits.push(SearchHit::new(title, self.abstract_url, clean_text(&self.abstract_text)));
        }

        let mut topics = Vec::new();
        flatten_topics(self.results, &mut topics);
        flatten_topics(self.related_topics, &mut topics);
        for topic in topics {
            if topic.text.is_empty() || topic.first_url.is_empty() {
                continue;
            }
            let text = clean_text(&topic.text);
            hits.push(SearchHit::new(title_from_text(&text), topic.first_url, text));
        }

        hits.truncate(max_results);
        hits
    }
}

fn flatten_topics(topics: Vec<Topic>, out: &mut Vec<Topic>) {
    for mut topic in topics {
        let nested = std::mem::take(&mut topic.topics);
        out.push(topic);
        flatten_topics(nested, out);
    }
}

/// Collapses runs of whitespace.
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Related-topic text reads "Title - description"; keep the title part.
fn title_from_text(text: &str) -> String {
    let head = text.split(" - ").next().unwrap_or(text);
    if head.chars().count() > 80 {
        let cut: String = head.chars().take(77).collect();
        format!("{}...", cut)
    } else {
        head.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Heading": "Courier",
        "AbstractText": "A courier is a company that delivers  messages and packages.",
        "AbstractURL": "https://en.wikipedia.org/wiki/Courier",
        "Results": [],
        "RelatedTopics": [
            {"Text": "Parcel - A package sent through the mail.", "FirstURL": "https://duckduckgo.com/Parcel"},
            {"Name": "Logistics", "Topics": [
                {"Text": "Last mile - Final step of delivery.", "FirstURL": "https://duckduckgo.com/Last_mile"}
            ]},
            {"Text": "", "FirstURL": ""}
        ]
    }"#;

    #[test]
    fn flattens_abstract_and_nested_topics() {
        let answer: InstantAnswer = serde_json::from_str(SAMPLE).unwrap();
        let hits = answer.into_hits(10);

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].title, "Courier");
        assert_eq!(hits[0].snippet, "A courier is a company that delivers messages and packages.");
        assert_eq!(hits[1].title, "Parcel");
        assert_eq!(hits[2].url, "https://duckduckgo.com/Last_mile");
    }

    #[test]
    fn truncates_to_max_results() {
        let answer: InstantAnswer = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(answer.into_hits(2).len(), 2);
    }

    #[test]
    fn empty_answer_has_no_hits() {
        let answer: InstantAnswer = serde_json::from_str("{}").unwrap();
        assert!(answer.into_hits(5).is_empty());
    }

    #[test]
    fn long_titles_are_shortened() {
        let title = title_from_text(&"x".repeat(120));
        assert_eq!(title.chars().count(), 80);
        assert!(title.ends_with("..."));
    }
}
