//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid request timeout for {0}")]
    InvalidTimeout(&'static str),

    #[error("Invalid URL for {0}")]
    InvalidUrl(&'static str),

    #[error("max_sources must be between {min} and {max}, got {value}")]
    MaxSourcesOutOfRange { value: usize, min: usize, max: usize },

    #[error("Fallback phone must be exactly 10 digits")]
    InvalidFallbackPhone,

    #[error("Seed order count must be at least the demo order count")]
    InvalidSeedCounts,

    #[error("Unknown log level: {0}")]
    InvalidLogLevel(String),
}
