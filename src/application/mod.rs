//! Application layer - The per-turn pipeline and the assistant facade.
//!
//! - `planner` - user text to [`Plan`](crate::domain::conversation::Plan)
//! - `dispatcher` - runs plan actions, raises pending confirmations
//! - `composer` - merges results into one reply
//! - `research` - web search plus synthesis
//! - `assistant` - owns the store and wires the stages together

mod assistant;
mod composer;
mod dispatcher;
mod model;
mod planner;
pub mod prompts;
mod research;

pub use assistant::{Assistant, AssistantSettings, SearchOutcome, Suggestions};
pub use composer::{fallback_compose, ComposeInput, OrderContext, ResponseComposer};
pub use dispatcher::{ActionDispatcher, DispatchOutcome};
pub use planner::IntentPlanner;
pub use research::SynthesizingResearcher;
