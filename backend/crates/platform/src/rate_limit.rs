//! Rate Limiting Infrastructure
//!
//! Fixed-window counters keyed by an arbitrary string (usually client IP plus
//! the guarded action). A four-digit PIN only has ten thousand values, so
//! every PIN check goes through one of these.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum attempts allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub retry_after: Duration,
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Record one attempt for `key` and report whether it is allowed
    async fn check_and_increment(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult;

    /// Report whether another attempt for `key` would be allowed, without recording one
    async fn check(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult;

    /// Forget all attempts for `key` (e.g. after a successful PIN check)
    async fn reset(&self, key: &str);
}

#[derive(Debug)]
struct Window {
    started: Instant,
    length: Duration,
    count: u32,
}

impl Window {
    fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.started) >= self.length
    }

    fn retry_after(&self, now: Instant) -> Duration {
        self.length.saturating_sub(now.duration_since(self.started))
    }
}

/// In-process store; good enough for a single household server
#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    windows: Mutex<HashMap<String, Window>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    async fn check_and_increment(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        // Drop expired windows so the map does not grow without bound
        windows.retain(|_, w| !w.expired(now));

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            length: config.window,
            count: 0,
        });
        let retry_after = window.retry_after(now);

        if window.count >= config.max_requests {
            return RateLimitResult {
                allowed: false,
                remaining: 0,
                retry_after,
            };
        }

        window.count += 1;
        RateLimitResult {
            allowed: true,
            remaining: config.max_requests - window.count,
            retry_after,
        }
    }

    async fn check(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult {
        let now = Instant::now();
        let windows = self.windows.lock().await;

        match windows.get(key).filter(|w| !w.expired(now)) {
            Some(window) => RateLimitResult {
                allowed: window.count < config.max_requests,
                remaining: config.max_requests.saturating_sub(window.count),
                retry_after: window.retry_after(now),
            },
            None => RateLimitResult {
                allowed: config.max_requests > 0,
                remaining: config.max_requests,
                retry_after: Duration::ZERO,
            },
        }
    }

    async fn reset(&self, key: &str) {
        self.windows.lock().await.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::{Duration, MemoryRateLimitStore, RateLimitConfig, RateLimitStore};

    #[tokio::test]
    async fn test_blocks_after_max_requests() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig::new(3, 60);

        for expected_remaining in [2, 1, 0] {
            let result = store.check_and_increment("1.2.3.4", &config).await;
            assert!(result.allowed);
            assert_eq!(result.remaining, expected_remaining);
        }

        let blocked = store.check_and_increment("1.2.3.4", &config).await;
        assert!(!blocked.allowed);
        assert!(blocked.retry_after <= Duration::from_secs(60));

        // Other keys are unaffected
        assert!(store.check_and_increment("5.6.7.8", &config).await.allowed);
    }

    #[tokio::test]
    async fn test_reset_clears_counter() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig::new(1, 60);

        assert!(store.check_and_increment("k", &config).await.allowed);
        assert!(!store.check_and_increment("k", &config).await.allowed);

        store.reset("k").await;
        assert!(store.check_and_increment("k", &config).await.allowed);
    }

    #[tokio::test]
    async fn test_check_does_not_record() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig::new(2, 60);

        for _ in 0..5 {
            let peek = store.check("k", &config).await;
            assert!(peek.allowed);
            assert_eq!(peek.remaining, 2);
        }

        store.check_and_increment("k", &config).await;
        store.check_and_increment("k", &config).await;
        let spent = store.check("k", &config).await;
        assert!(!spent.allowed);
        assert_eq!(spent.remaining, 0);
    }

    #[tokio::test]
    async fn test_window_expires() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig {
            max_requests: 1,
            window: Duration::from_millis(20),
        };

        assert!(store.check_and_increment("k", &config).await.allowed);
        assert!(!store.check_and_increment("k", &config).await.allowed);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(store.check_and_increment("k", &config).await.allowed);
    }
}
