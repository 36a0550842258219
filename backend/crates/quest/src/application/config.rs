//! Application Configuration
//!
//! Configuration for the Quest Mania application layer.

use platform::rate_limit::RateLimitConfig;

/// PIN used by `development()` when none is configured
pub const DEVELOPMENT_MASTER_PIN: &str = "0606";

/// Quest Mania application configuration
#[derive(Debug, Clone)]
pub struct QuestConfig {
    /// Shared Quest Master PIN guarding master-only routes
    pub master_pin: String,
    /// Prefix of issued redemption certificates
    pub certificate_prefix: String,
    /// PIN attempts allowed per client and window (master and seeker PINs)
    pub pin_attempts: RateLimitConfig,
    /// Wrong PINs allowed per window for one PIN, across all clients
    pub pin_failures: RateLimitConfig,
    /// Key clients by `X-Forwarded-For` (only behind a proxy that sets it)
    pub trust_forwarded_for: bool,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self {
            master_pin: String::new(),
            certificate_prefix: "QM".to_string(),
            pin_attempts: RateLimitConfig::new(10, 60),
            pin_failures: RateLimitConfig::new(30, 60),
            trust_forwarded_for: false,
        }
    }
}

impl QuestConfig {
    pub fn with_master_pin(master_pin: impl Into<String>) -> Self {
        Self {
            master_pin: master_pin.into(),
            ..Default::default()
        }
    }

    /// Config for local development (well-known master PIN)
    pub fn development() -> Self {
        Self::with_master_pin(DEVELOPMENT_MASTER_PIN)
    }

    /// An empty master PIN would lock every master route
    pub fn has_master_pin(&self) -> bool {
        !self.master_pin.trim().is_empty()
    }
}
