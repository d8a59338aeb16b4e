//! Web research configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::conversation::{ResearchDepth, WebSettings, MAX_SOURCES, MIN_SOURCES};

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Whether new sessions start with web research on
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub depth: ResearchDepth,

    #[serde(default = "default_max_sources")]
    pub max_sources: usize,

    /// DuckDuckGo Instant Answer endpoint
    #[serde(default = "default_search_endpoint")]
    pub search_endpoint: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl WebConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Initial web settings for a new session.
    pub fn session_defaults(&self) -> WebSettings {
        WebSettings {
            enabled: self.enabled,
            depth: self.depth,
            ..WebSettings::default()
        }
        .with_max_sources(self.max_sources)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_SOURCES..=MAX_SOURCES).contains(&self.max_sources) {
            return Err(ValidationError::MaxSourcesOutOfRange {
                value: self.max_sources,
                min: MIN_SOURCES,
                max: MAX_SOURCES,
            });
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("web"));
        }
        if !self.search_endpoint.starts_with("http://")
            && !self.search_endpoint.starts_with("https://")
        {
            return Err(ValidationError::InvalidUrl("web.search_endpoint"));
        }
        Ok(())
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            depth: ResearchDepth::default(),
            max_sources: default_max_sources(),
            search_endpoint: default_search_endpoint(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_max_sources() -> usize {
    4
}

fn default_search_endpoint() -> String {
    "https://api.duckduckgo.com/".to_string()
}

fn default_timeout() -> u64 {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_defaults_are_valid() {
        let config = WebConfig::default();
        assert!(config.enabled);
        assert_eq!(config.depth, ResearchDepth::Normal);
        assert!(config.validate().is_ok());
        assert_eq!(config.session_defaults().max_sources, 4);
    }

    #[test]
    fn test_max_sources_range() {
        for (value, ok) in [(1, false), (2, true), (6, true), (7, false)] {
            let config = WebConfig {
                max_sources: value,
                ..Default::default()
            };
            assert_eq!(config.validate().is_ok(), ok, "max_sources = {}", value);
        }
    }

    #[test]
    fn test_depth_deserializes_lowercase() {
        let config: WebConfig = serde_json::from_str(r#"{"depth": "deep"}"#).unwrap();
        assert_eq!(config.depth, ResearchDepth::Deep);
        assert_eq!(config.max_sources, 4);
    }
}
