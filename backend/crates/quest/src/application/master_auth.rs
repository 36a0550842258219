//! Master Auth Use Case
//!
//! Checks a presented PIN against the configured Quest Master PIN. Attempts
//! are counted by [`PinAttempts`].

use std::sync::Arc;

use platform::crypto::secrets_match;
use platform::rate_limit::RateLimitStore;

use crate::application::config::QuestConfig;
use crate::application::pin_attempts::PinAttempts;
use crate::error::{QuestError, QuestResult};

pub struct MasterAuthUseCase<L>
where
    L: RateLimitStore,
{
    limiter: Arc<L>,
    config: Arc<QuestConfig>,
}

impl<L> MasterAuthUseCase<L>
where
    L: RateLimitStore,
{
    pub fn new(limiter: Arc<L>, config: Arc<QuestConfig>) -> Self {
        Self { limiter, config }
    }

    /// `client_key` identifies the caller (usually its IP address)
    pub async fn verify(&self, pin: Option<&str>, client_key: &str) -> QuestResult<()> {
        let pin = pin.ok_or(QuestError::MasterPinRequired)?;
        let attempts = PinAttempts::new(&*self.limiter, &self.config, "master", client_key);
        let remaining = attempts.admit().await?;

        if !self.config.has_master_pin() || !secrets_match(pin, &self.config.master_pin) {
            attempts.failed().await;
            tracing::warn!(client = %client_key, remaining, "Invalid master PIN");
            return Err(QuestError::InvalidMasterPin);
        }

        attempts.succeeded().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::rate_limit::{MemoryRateLimitStore, RateLimitConfig};

    fn use_case(max_attempts: u32) -> MasterAuthUseCase<MemoryRateLimitStore> {
        let config = QuestConfig {
            pin_attempts: RateLimitConfig::new(max_attempts, 60),
            ..QuestConfig::development()
        };
        MasterAuthUseCase::new(Arc::new(MemoryRateLimitStore::new()), Arc::new(config))
    }

    #[tokio::test]
    async fn test_accepts_configured_pin() {
        let auth = use_case(3);
        assert!(auth.verify(Some("0606"), "127.0.0.1").await.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_missing_and_wrong_pin() {
        let auth = use_case(3);
        assert!(matches!(
            auth.verify(None, "127.0.0.1").await,
            Err(QuestError::MasterPinRequired)
        ));
        assert!(matches!(
            auth.verify(Some("1234"), "127.0.0.1").await,
            Err(QuestError::InvalidMasterPin)
        ));
    }

    #[tokio::test]
    async fn test_locks_out_after_repeated_failures() {
        let auth = use_case(2);
        for _ in 0..2 {
            assert!(matches!(
                auth.verify(Some("0000"), "10.0.0.7").await,
                Err(QuestError::InvalidMasterPin)
            ));
        }
        assert!(matches!(
            auth.verify(Some("0606"), "10.0.0.7").await,
            Err(QuestError::TooManyAttempts)
        ));
        // Other clients are not affected
        assert!(auth.verify(Some("0606"), "10.0.0.8").await.is_ok());
    }

    #[tokio::test]
    async fn test_rotating_clients_hit_shared_lockout() {
        let auth = use_case(100);
        let mut throttled = false;
        for n in 0..40 {
            match auth.verify(Some("0000"), &format!("10.{n}.0.1")).await {
                Err(QuestError::InvalidMasterPin) => {}
                Err(QuestError::TooManyAttempts) => {
                    throttled = true;
                    break;
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
        assert!(throttled);
        assert!(matches!(
            auth.verify(Some("0606"), "10.200.0.1").await,
            Err(QuestError::TooManyAttempts)
        ));
    }

    #[tokio::test]
    async fn test_empty_master_pin_rejects_everything() {
        let auth = MasterAuthUseCase::new(
            Arc::new(MemoryRateLimitStore::new()),
            Arc::new(QuestConfig::default()),
        );
        assert!(matches!(
            auth.verify(Some(""), "127.0.0.1").await,
            Err(QuestError::InvalidMasterPin)
        ));
    }
}
