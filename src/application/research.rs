//! Web research: search, collect snippets, synthesize an answer.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::model::complete_text;
use super::prompts::{SYNTHESIS_PROMPT, SYNTHESIS_TEMPERATURE};
use crate::domain::conversation::{ResearchAnswer, ResearchDepth, Source};
use crate::domain::foundation::SessionId;
use crate::ports::{AIProvider, CompletionPurpose, SearchHit, SearchProvider, WebResearcher};

const NO_RESULTS: &str = "I could not summarize results.";
const SYNTHESIS_FAILED: &str = "I tried, but couldn’t summarize results right now.";
const SNIPPETS_IN_FALLBACK: usize = 3;

#[derive(Debug, Serialize)]
struct Snippet<'a> {
    title: &'a str,
    url: &'a str,
    snippet: &'a str,
}

#[derive(Debug, Serialize)]
struct SynthesisBundle<'a> {
    question: &'a str,
    snippets: Vec<Snippet<'a>>,
    style: ResearchDepth,
}

/// [`WebResearcher`] over a search provider and an optional model.
pub struct SynthesizingResearcher {
    search: Arc<dyn SearchProvider>,
    model: Option<Arc<dyn AIProvider>>,
}

impl SynthesizingResearcher {
    pub fn new(search: Arc<dyn SearchProvider>, model: Option<Arc<dyn AIProvider>>) -> Self {
        Self { search, model }
    }

    async fn synthesize(
        &self,
        session_id: &SessionId,
        query: &str,
        hits: &[SearchHit],
        depth: ResearchDepth,
    ) -> String {
        let snippets: Vec<Snippet<'_>> = hits
            .iter()
            .filter(|h| !h.snippet.is_empty())
            .map(|h| Snippet {
                title: &h.title,
                url: &h.url,
                snippet: &h.snippet,
            })
            .collect();

        let Some(model) = &self.model else {
            let joined = snippets
                .iter()
                .take(SNIPPETS_IN_FALLBACK)
                .map(|s| s.snippet)
                .collect::<Vec<_>>()
                .join(" • ");
            return if joined.is_empty() {
                NO_RESULTS.to_string()
            } else {
                joined
            };
        };

        let bundle = SynthesisBundle {
            question: query,
            snippets,
            style: depth,
        };
        let Ok(payload) = serde_json::to_string(&bundle) else {
            return SYNTHESIS_FAILED.to_string();
        };

        complete_text(
            model.as_ref(),
            session_id,
            CompletionPurpose::Synthesize,
            SYNTHESIS_PROMPT,
            &payload,
            SYNTHESIS_TEMPERATURE,
        )
        .await
        .unwrap_or_else(|_| SYNTHESIS_FAILED.to_string())
    }
}

#[async_trait]
impl WebResearcher for SynthesizingResearcher {
    async fn research(
        &self,
        session_id: &SessionId,
        query: &str,
        depth: ResearchDepth,
        max_sources: usize,
    ) -> ResearchAnswer {
        let hits = match self.search.search(query, max_sources).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "web search failed");
                Vec::new()
            }
        };

        let sources = hits
            .iter()
            .take(max_sources)
            .enumerate()
            .map(|(i, hit)| Source {
                index: i + 1,
                title: if hit.title.is_empty() {
                    hit.url.clone()
                } else {
                    hit.title.clone()
                },
                url: hit.url.clone(),
            })
            .collect::<Vec<_>>();

        let answer = self.synthesize(session_id, query, &hits, depth).await;
        info!(query, %depth, sources = sources.len(), "web research done");
        ResearchAnswer { answer, sources }
    }
}
