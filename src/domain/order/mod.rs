//! Order domain: the order entity, its eligibility rules, the in-memory store
//! with its undo log, and the toolkit that mutates orders safely.

mod analytics;
mod faq;
#[allow(clippy::module_inception)]
mod order;
mod status;
mod store;
mod toolkit;

pub mod rules;
pub mod seed;

pub use analytics::{DeliveryAnalytics, DeliveryAverage, MIN_ITEM_SAMPLES};
pub use faq::{policy_answer, FaqTopic};
pub use order::Order;
pub use seed::{seed_orders, seed_store, SeedError, SeedOptions};
pub use status::OrderStatus;
pub use store::{
    ActionKind, ActionLogEntry, LastActionInfo, OrderStore, StoreError, UndoError, UNDO_GRACE_SECS,
};
pub use toolkit::{ActionToolkit, ToolkitError, REFUND_PENDING_PICKUP};
