//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, errors, state machine)
//! - `order` - Orders, eligibility rules, the in-memory store and the toolkit
//! - `conversation` - Intents, plans, pending confirmations and session state

pub mod conversation;
pub mod foundation;
pub mod order;
