//! Web search adapters.

mod duckduckgo;
mod mock;

pub use duckduckgo::{DuckDuckGoConfig, DuckDuckGoSearch, DEFAULT_ENDPOINT};
pub use mock::MockSearchProvider;
