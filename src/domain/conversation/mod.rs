//! Conversation domain: intents, plans, pending confirmations and the
//! session context threaded through each turn.

mod extractor;
mod intent;
mod message;
mod negation;
mod pending;
mod plan;
mod research;
mod session;

pub use extractor::{
    extract_json_object, extract_new_address, extract_order_id, normalize_login_phone,
    PlanParseError,
};
pub use intent::{Intent, IntentClassifier, KeywordIntentClassifier};
pub use message::{ChatMessage, Role};
pub use negation::is_negated_cancel;
pub use pending::PendingConfirmation;
pub use plan::{ActionTag, Plan, RawPlan};
pub use research::{citation_block, ResearchAnswer, ResearchDepth, Source};
pub use session::{SearchFilter, SessionContext, WebSettings, MAX_SOURCES, MIN_SOURCES};
