//! Web research value types shared by the session and the research port.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// How much detail a synthesized web answer should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchDepth {
    Brief,
    #[default]
    Normal,
    Deep,
}

impl ResearchDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchDepth::Brief => "brief",
            ResearchDepth::Normal => "normal",
            ResearchDepth::Deep => "deep",
        }
    }
}

impl fmt::Display for ResearchDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResearchDepth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "brief" => Ok(ResearchDepth::Brief),
            "normal" => Ok(ResearchDepth::Normal),
            "deep" => Ok(ResearchDepth::Deep),
            other => Err(ValidationError::invalid_format(
                "depth",
                format!("expected brief, normal or deep, got '{}'", other),
            )),
        }
    }
}

/// A cited source, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub index: usize,
    pub title: String,
    pub url: String,
}

impl Source {
    /// `[i] title — url`
    pub fn citation(&self) -> String {
        format!("[{}] {} — {}", self.index, self.title, self.url)
    }
}

/// Synthesized answer plus the sources it drew on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResearchAnswer {
    pub answer: String,
    pub sources: Vec<Source>,
}

/// Newline-separated citations for a list of sources.
pub fn citation_block(sources: &[Source]) -> String {
    sources
        .iter()
        .map(Source::citation)
        .collect::<Vec<_>>()
        .join("\n")
}
