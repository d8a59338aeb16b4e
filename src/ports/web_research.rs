//! Web research port: question in, synthesized answer with sources out.

use async_trait::async_trait;

use crate::domain::conversation::{ResearchAnswer, ResearchDepth};
use crate::domain::foundation::SessionId;

/// Port for answering open questions from the web.
///
/// Implementations never fail; problems are reported inside the answer text.
#[async_trait]
pub trait WebResearcher: Send + Sync {
    async fn research(
        &self,
        session_id: &SessionId,
        query: &str,
        depth: ResearchDepth,
        max_sources: usize,
    ) -> ResearchAnswer;
}
