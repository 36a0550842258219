//! Seeker Use Cases

use std::sync::Arc;

use kernel::id::SeekerId;
use platform::crypto::secrets_match;
use platform::rate_limit::RateLimitStore;
use serde::Deserialize;

use crate::application::config::QuestConfig;
use crate::application::pin_attempts::PinAttempts;
use crate::application::required_text;
use crate::domain::entities::{Quest, Seeker, SeekerChanges};
use crate::domain::repository::{QuestRepository, SeekerRepository};
use crate::domain::value_objects::{SeekerPin, Stars};
use crate::error::{QuestError, QuestResult};

/// Input for creating a seeker
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSeeker {
    /// Client-chosen id; a UUID is minted when absent
    #[serde(default)]
    pub id: Option<SeekerId>,
    pub name: String,
    pub pin: SeekerPin,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub stars: Option<i32>,
}

/// Partial update; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeekerPatch {
    pub name: Option<String>,
    pub pin: Option<SeekerPin>,
    pub avatar_url: Option<String>,
    pub stars: Option<i32>,
}

fn balance(value: i32) -> QuestResult<Stars> {
    Stars::new(value).ok_or_else(|| QuestError::validation("stars must not be negative"))
}

pub struct SeekerUseCase<R>
where
    R: SeekerRepository + QuestRepository,
{
    repo: Arc<R>,
}

impl<R> SeekerUseCase<R>
where
    R: SeekerRepository + QuestRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> QuestResult<Vec<Seeker>> {
        self.repo.list_seekers().await
    }

    pub async fn get(&self, id: &SeekerId) -> QuestResult<Seeker> {
        self.repo
            .find_seeker(id)
            .await?
            .ok_or(QuestError::SeekerNotFound)
    }

    pub async fn create(&self, input: NewSeeker) -> QuestResult<Seeker> {
        let seeker = Seeker {
            id: input.id.unwrap_or_default(),
            name: required_text("name", &input.name)?,
            pin: input.pin,
            avatar_url: input.avatar_url.unwrap_or_default(),
            stars: balance(input.stars.unwrap_or(0))?,
        };

        self.repo.create_seeker(&seeker).await?;
        tracing::info!(seeker_id = %seeker.id, "Seeker created");
        Ok(seeker)
    }

    pub async fn update(&self, id: &SeekerId, patch: SeekerPatch) -> QuestResult<Seeker> {
        let changes = SeekerChanges {
            name: patch
                .name
                .map(|name| required_text("name", &name))
                .transpose()?,
            pin: patch.pin,
            avatar_url: patch.avatar_url,
            stars: patch.stars.map(balance).transpose()?,
        };

        let seeker = self
            .repo
            .update_seeker(id, &changes)
            .await?
            .ok_or(QuestError::SeekerNotFound)?;
        tracing::info!(seeker_id = %seeker.id, stars = seeker.stars.get(), "Seeker updated");
        Ok(seeker)
    }

    /// Deleting an unknown seeker is not an error
    pub async fn delete(&self, id: &SeekerId) -> QuestResult<bool> {
        let deleted = self.repo.delete_seeker(id).await?;
        if deleted {
            tracing::info!(seeker_id = %id, "Seeker deleted");
        }
        Ok(deleted)
    }

    pub async fn open_quests(&self, id: &SeekerId) -> QuestResult<Vec<Quest>> {
        self.repo.list_quests_for_seeker(id).await
    }
}

/// Seeker login: checks the seeker's own PIN
pub struct SeekerLoginUseCase<R, L>
where
    R: SeekerRepository,
    L: RateLimitStore,
{
    repo: Arc<R>,
    limiter: Arc<L>,
    config: Arc<QuestConfig>,
}

impl<R, L> SeekerLoginUseCase<R, L>
where
    R: SeekerRepository,
    L: RateLimitStore,
{
    pub fn new(repo: Arc<R>, limiter: Arc<L>, config: Arc<QuestConfig>) -> Self {
        Self {
            repo,
            limiter,
            config,
        }
    }

    pub async fn execute(&self, id: &SeekerId, pin: &str, client_key: &str) -> QuestResult<Seeker> {
        let scope = format!("seeker:{id}");
        let attempts = PinAttempts::new(&*self.limiter, &self.config, &scope, client_key);
        let remaining = attempts.admit().await?;

        let seeker = self
            .repo
            .find_seeker(id)
            .await?
            .ok_or(QuestError::SeekerNotFound)?;

        if !secrets_match(pin.trim(), seeker.pin.as_str()) {
            attempts.failed().await;
            tracing::warn!(seeker_id = %id, remaining, "Seeker PIN rejected");
            return Err(QuestError::InvalidSeekerPin);
        }

        attempts.succeeded().await;
        tracing::info!(seeker_id = %id, "Seeker logged in");
        Ok(seeker)
    }
}
