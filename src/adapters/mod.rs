//! Adapters - Implementations of the port interfaces.
//!
//! - `ai` - Language model providers
//! - `search` - Web search providers

pub mod ai;
pub mod search;
