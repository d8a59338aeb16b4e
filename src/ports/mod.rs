//! Ports - Interfaces between the application and external collaborators.
//!
//! - `AIProvider` - Chat-completion language models
//! - `SearchProvider` - Keyword web search
//! - `WebResearcher` - Search plus synthesis into a cited answer

mod ai_provider;
mod search_provider;
mod web_research;

pub use ai_provider::{
    AIError, AIProvider, CompletionPurpose, CompletionRequest, CompletionResponse, FinishReason,
    Message, MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use search_provider::{SearchError, SearchHit, SearchProvider};
pub use web_research::WebResearcher;
