//! Order Copilot - Order Tracking Support Assistant
//!
//! A conversational assistant over an in-memory order store. Each turn is
//! planned (by a language model when one is configured, otherwise by keyword
//! rules), dispatched to the order toolkit and optional web research, and
//! composed into a single reply. Destructive actions wait for an explicit
//! confirmation and can be undone for five minutes.

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod ports;
