//! PIN Attempt Accounting
//!
//! Every PIN check counts against the caller's own bucket (`{scope}:{client}`).
//! Wrong PINs also count against a bucket shared by all callers
//! (`{scope}:*`), so changing the client address does not buy more guesses.

use platform::rate_limit::RateLimitStore;

use crate::application::config::QuestConfig;
use crate::error::{QuestError, QuestResult};

pub struct PinAttempts<'a, L>
where
    L: RateLimitStore,
{
    limiter: &'a L,
    config: &'a QuestConfig,
    client_bucket: String,
    shared_bucket: String,
}

impl<'a, L> PinAttempts<'a, L>
where
    L: RateLimitStore,
{
    /// `scope` names the guarded PIN, e.g. `master` or `seeker:S1`
    pub fn new(limiter: &'a L, config: &'a QuestConfig, scope: &str, client_key: &str) -> Self {
        Self {
            limiter,
            config,
            client_bucket: format!("{scope}:{client_key}"),
            shared_bucket: format!("{scope}:*"),
        }
    }

    /// Count one attempt; returns the caller's remaining attempts
    pub async fn admit(&self) -> QuestResult<u32> {
        let shared = self
            .limiter
            .check(&self.shared_bucket, &self.config.pin_failures)
            .await;
        if !shared.allowed {
            tracing::warn!(
                bucket = %self.shared_bucket,
                retry_after_secs = shared.retry_after.as_secs(),
                "PIN locked for all clients"
            );
            return Err(QuestError::TooManyAttempts);
        }

        let attempt = self
            .limiter
            .check_and_increment(&self.client_bucket, &self.config.pin_attempts)
            .await;
        if !attempt.allowed {
            tracing::warn!(
                bucket = %self.client_bucket,
                retry_after_secs = attempt.retry_after.as_secs(),
                "PIN attempts exhausted"
            );
            return Err(QuestError::TooManyAttempts);
        }
        Ok(attempt.remaining)
    }

    pub async fn failed(&self) {
        self.limiter
            .check_and_increment(&self.shared_bucket, &self.config.pin_failures)
            .await;
    }

    /// A correct PIN clears the caller's own bucket only
    pub async fn succeeded(&self) {
        self.limiter.reset(&self.client_bucket).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::rate_limit::{MemoryRateLimitStore, RateLimitConfig};

    fn config() -> QuestConfig {
        QuestConfig {
            pin_attempts: RateLimitConfig::new(3, 60),
            pin_failures: RateLimitConfig::new(5, 60),
            ..QuestConfig::development()
        }
    }

    #[tokio::test]
    async fn test_failures_from_many_clients_share_a_cap() {
        let limiter = MemoryRateLimitStore::new();
        let config = config();

        for n in 0..5 {
            let attempts = PinAttempts::new(&limiter, &config, "master", &format!("10.0.0.{n}"));
            assert!(attempts.admit().await.is_ok());
            attempts.failed().await;
        }

        let fresh = PinAttempts::new(&limiter, &config, "master", "10.0.0.99");
        assert!(matches!(fresh.admit().await, Err(QuestError::TooManyAttempts)));

        // Other scopes keep their own cap
        let seeker = PinAttempts::new(&limiter, &config, "seeker:S1", "10.0.0.99");
        assert!(seeker.admit().await.is_ok());
    }

    #[tokio::test]
    async fn test_successes_do_not_drain_the_shared_cap() {
        let limiter = MemoryRateLimitStore::new();
        let config = config();
        let attempts = PinAttempts::new(&limiter, &config, "master", "127.0.0.1");

        for _ in 0..20 {
            assert!(attempts.admit().await.is_ok());
            attempts.succeeded().await;
        }
    }

    #[tokio::test]
    async fn test_client_bucket_counts_every_attempt() {
        let limiter = MemoryRateLimitStore::new();
        let config = config();
        let attempts = PinAttempts::new(&limiter, &config, "master", "127.0.0.1");

        assert_eq!(attempts.admit().await.unwrap(), 2);
        assert_eq!(attempts.admit().await.unwrap(), 1);
        assert_eq!(attempts.admit().await.unwrap(), 0);
        assert!(matches!(attempts.admit().await, Err(QuestError::TooManyAttempts)));
    }
}
