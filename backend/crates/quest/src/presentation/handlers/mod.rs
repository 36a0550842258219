//! HTTP Handlers
//!
//! Handlers are generic over the repository so the same router runs on
//! PostgreSQL in production and on the in-memory store in tests.

pub mod master;
pub mod prizes;
pub mod quests;
pub mod seekers;
pub mod suggestions;

use std::sync::Arc;

use axum::body::Bytes;
use platform::rate_limit::MemoryRateLimitStore;
use serde::de::DeserializeOwned;

use crate::application::config::QuestConfig;
use crate::domain::repository::QuestStore;
use crate::error::{QuestError, QuestResult};

/// Shared state for Quest Mania handlers
#[derive(Clone)]
pub struct QuestAppState<R>
where
    R: QuestStore,
{
    pub repo: Arc<R>,
    pub config: Arc<QuestConfig>,
    /// PIN attempt counters, shared by master and seeker PIN checks
    pub limiter: Arc<MemoryRateLimitStore>,
}

impl<R> QuestAppState<R>
where
    R: QuestStore,
{
    pub fn new(repo: R, config: QuestConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
            limiter: Arc::new(MemoryRateLimitStore::new()),
        }
    }
}

/// Decode an optional JSON body; an empty body yields the default
pub(crate) fn optional_json<T>(body: &Bytes) -> QuestResult<T>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| QuestError::validation(format!("Failed to parse the request body as JSON: {e}")))
}
