//! Quest Suggestion Use Case

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{QuestId, SeekerId, SuggestionId};
use serde::Deserialize;

use crate::application::quests::reward;
use crate::application::required_text;
use crate::domain::entities::{Quest, QuestSuggestion};
use crate::domain::repository::SuggestionRepository;
use crate::domain::value_objects::{QuestDuration, SuggestionStatus};
use crate::error::{QuestError, QuestResult};

/// A seeker's proposal; id, status and timestamp are set by the server
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSuggestion {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub suggested_by: SeekerId,
    pub desired_reward: i32,
    #[serde(default)]
    pub duration: QuestDuration,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub desired_reward: Option<i32>,
    pub duration: Option<QuestDuration>,
}

pub struct SuggestionUseCase<R>
where
    R: SuggestionRepository,
{
    repo: Arc<R>,
}

impl<R> SuggestionUseCase<R>
where
    R: SuggestionRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> QuestResult<Vec<QuestSuggestion>> {
        self.repo.list_suggestions().await
    }

    pub async fn create(&self, input: NewSuggestion) -> QuestResult<QuestSuggestion> {
        let suggestion = QuestSuggestion {
            id: SuggestionId::new(),
            title: required_text("title", &input.title)?,
            description: input.description.unwrap_or_default(),
            suggested_by: input.suggested_by,
            status: SuggestionStatus::Pending,
            created_at: Utc::now(),
            desired_reward: reward(input.desired_reward)?,
            duration: input.duration,
        };

        self.repo.create_suggestion(&suggestion).await?;
        tracing::info!(
            suggestion_id = %suggestion.id,
            seeker_id = %suggestion.suggested_by,
            "Quest suggested"
        );
        Ok(suggestion)
    }

    pub async fn update(
        &self,
        id: &SuggestionId,
        patch: SuggestionPatch,
    ) -> QuestResult<QuestSuggestion> {
        let mut suggestion = self
            .repo
            .find_suggestion(id)
            .await?
            .ok_or(QuestError::SuggestionNotFound)?;
        if suggestion.status != SuggestionStatus::Pending {
            return Err(QuestError::SuggestionReviewed);
        }

        if let Some(title) = patch.title {
            suggestion.title = required_text("title", &title)?;
        }
        if let Some(description) = patch.description {
            suggestion.description = description;
        }
        if let Some(value) = patch.desired_reward {
            suggestion.desired_reward = reward(value)?;
        }
        if let Some(duration) = patch.duration {
            suggestion.duration = duration;
        }

        if !self.repo.update_suggestion(&suggestion).await? {
            return Err(QuestError::SuggestionReviewed);
        }
        Ok(suggestion)
    }

    /// Materialize the suggestion as an `active` quest for its author
    pub async fn approve(&self, id: &SuggestionId) -> QuestResult<(QuestSuggestion, Quest)> {
        let (suggestion, quest) = self
            .repo
            .approve_suggestion(id, &QuestId::new(), Utc::now())
            .await?;
        tracing::info!(
            suggestion_id = %id,
            quest_id = %quest.id,
            reward = quest.reward.get(),
            "Quest suggestion approved"
        );
        Ok((suggestion, quest))
    }

    pub async fn reject(&self, id: &SuggestionId) -> QuestResult<QuestSuggestion> {
        let suggestion = self.repo.reject_suggestion(id).await?;
        tracing::info!(suggestion_id = %id, "Quest suggestion rejected");
        Ok(suggestion)
    }
}
