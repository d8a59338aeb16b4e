//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ORDER_COPILOT` prefix and nested values use double underscores as separators.
//!
//! Every value has a default, so an empty environment yields a working
//! offline configuration (no model, seeded demo store, web research on).
//!
//! # Example
//!
//! ```no_run
//! use order_copilot::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Model configured: {}", config.ai.usable_key().is_some());
//! ```

mod ai;
mod demo;
mod error;
mod features;
mod web;

pub use ai::AiConfig;
pub use demo::DemoConfig;
pub use error::{ConfigError, ValidationError};
pub use features::FeatureFlags;
pub use web::WebConfig;

use serde::Deserialize;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Language model configuration (OpenAI)
    #[serde(default)]
    pub ai: AiConfig,

    /// Web research configuration (DuckDuckGo)
    #[serde(default)]
    pub web: WebConfig,

    /// Seeded demo data
    #[serde(default)]
    pub demo: DemoConfig,

    /// Feature flags
    #[serde(default)]
    pub features: FeatureFlags,

    /// Default tracing filter; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ORDER_COPILOT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ORDER_COPILOT__AI__MODEL=gpt-4o` -> `ai.model = gpt-4o`
    /// - `ORDER_COPILOT__WEB__MAX_SOURCES=6` -> `web.max_sources = 6`
    /// - `OPENAI_API_KEY=sk-...` is used when `ORDER_COPILOT__AI__OPENAI_API_KEY` is unset
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            builder = builder.set_default("ai.openai_api_key", key)?;
        }

        let config = builder
            .add_source(
                config::Environment::default()
                    .prefix("ORDER_COPILOT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.web.validate()?;
        self.demo.validate()?;
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidLogLevel(self.log_level.clone()));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ai: AiConfig::default(),
            web: WebConfig::default(),
            demo: DemoConfig::default(),
            features: FeatureFlags::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
