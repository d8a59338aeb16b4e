//! Demo data configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::order::seed::SeedOptions;

/// Seeded store and demo login settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    /// Login whose orders are shown to sessions that have none
    #[serde(default = "default_fallback_phone")]
    pub fallback_phone: String,

    #[serde(default = "default_seed_order_count")]
    pub seed_order_count: usize,

    #[serde(default = "default_rng_seed")]
    pub rng_seed: u64,

    /// Orders reassigned to the fallback phone
    #[serde(default = "default_demo_order_count")]
    pub demo_order_count: usize,
}

impl DemoConfig {
    pub fn seed_options(&self) -> SeedOptions {
        SeedOptions {
            order_count: self.seed_order_count,
            rng_seed: self.rng_seed,
            demo_phone: self.fallback_phone.clone(),
            demo_order_count: self.demo_order_count,
            ..SeedOptions::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.fallback_phone.len() != 10 || !self.fallback_phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidFallbackPhone);
        }
        if self.demo_order_count > self.seed_order_count {
            return Err(ValidationError::InvalidSeedCounts);
        }
        Ok(())
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            fallback_phone: default_fallback_phone(),
            seed_order_count: default_seed_order_count(),
            rng_seed: default_rng_seed(),
            demo_order_count: default_demo_order_count(),
        }
    }
}

fn default_fallback_phone() -> String {
    "9876543210".to_string()
}

fn default_seed_order_count() -> usize {
    260
}

fn default_rng_seed() -> u64 {
    42
}

fn default_demo_order_count() -> usize {
    10
}
