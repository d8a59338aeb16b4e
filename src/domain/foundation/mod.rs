//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, the state machine trait and error
//! types that form the vocabulary of the order assistant domain.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{ActionId, OrderId, SessionId};
pub use state_machine::StateMachine;
pub use timestamp::{today, Timestamp};
