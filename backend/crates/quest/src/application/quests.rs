//! Quest Management Use Case
//!
//! Master-side CRUD on quests. Status is never edited here; it only moves
//! through the lifecycle use case.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::QuestId;
use serde::Deserialize;

use crate::application::required_text;
use crate::domain::entities::{Quest, QuestHistoryEntry};
use crate::domain::repository::QuestRepository;
use crate::domain::value_objects::{Assignees, QuestDuration, QuestStatus, Stars};
use crate::error::{QuestError, QuestResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuest {
    #[serde(default)]
    pub id: Option<QuestId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub reward: i32,
    #[serde(default)]
    pub duration: QuestDuration,
    #[serde(default)]
    pub assigned_to: Assignees,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub reward: Option<i32>,
    pub duration: Option<QuestDuration>,
    pub assigned_to: Option<Assignees>,
}

pub(crate) fn reward(value: i32) -> QuestResult<Stars> {
    Stars::positive(value).ok_or_else(|| QuestError::validation("reward must be greater than zero"))
}

pub struct QuestUseCase<R>
where
    R: QuestRepository,
{
    repo: Arc<R>,
}

impl<R> QuestUseCase<R>
where
    R: QuestRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> QuestResult<Vec<Quest>> {
        self.repo.list_quests().await
    }

    pub async fn get(&self, id: &QuestId) -> QuestResult<Quest> {
        self.repo
            .find_quest(id)
            .await?
            .ok_or(QuestError::QuestNotFound)
    }

    pub async fn history(&self) -> QuestResult<Vec<QuestHistoryEntry>> {
        self.repo.quest_history().await
    }

    pub async fn create(&self, input: NewQuest) -> QuestResult<Quest> {
        let quest = Quest {
            id: input.id.unwrap_or_default(),
            title: required_text("title", &input.title)?,
            description: input.description.unwrap_or_default(),
            reward: reward(input.reward)?,
            status: QuestStatus::Active,
            duration: input.duration,
            assigned_to: input.assigned_to,
            started_at: None,
            completed_at: None,
            completed_by: None,
            created_at: Utc::now(),
        };

        self.repo.create_quest(&quest).await?;
        tracing::info!(
            quest_id = %quest.id,
            reward = quest.reward.get(),
            assignees = quest.assigned_to.len(),
            "Quest created"
        );
        Ok(quest)
    }

    pub async fn update(&self, id: &QuestId, patch: QuestPatch) -> QuestResult<Quest> {
        let mut quest = self.get(id).await?;
        if quest.status == QuestStatus::Completed {
            return Err(QuestError::QuestCompleted);
        }

        if let Some(title) = patch.title {
            quest.title = required_text("title", &title)?;
        }
        if let Some(description) = patch.description {
            quest.description = description;
        }
        if let Some(value) = patch.reward {
            quest.reward = reward(value)?;
        }
        if let Some(duration) = patch.duration {
            quest.duration = duration;
        }
        if let Some(assigned_to) = patch.assigned_to {
            quest.assigned_to = assigned_to;
        }

        self.save(quest).await
    }

    /// Replace the assignee set
    pub async fn assign(&self, id: &QuestId, assignees: Assignees) -> QuestResult<Quest> {
        let mut quest = self.get(id).await?;
        if quest.status == QuestStatus::Completed {
            return Err(QuestError::QuestCompleted);
        }
        quest.assigned_to = assignees;
        self.save(quest).await
    }

    async fn save(&self, quest: Quest) -> QuestResult<Quest> {
        if !self.repo.update_quest(&quest).await? {
            // Gone, or completed in the meantime
            return match self.repo.find_quest(&quest.id).await? {
                Some(_) => Err(QuestError::QuestCompleted),
                None => Err(QuestError::QuestNotFound),
            };
        }
        tracing::info!(quest_id = %quest.id, "Quest updated");
        Ok(quest)
    }

    /// Completed quests are kept; deleting an unknown quest is not an error
    pub async fn delete(&self, id: &QuestId) -> QuestResult<bool> {
        let deleted = self.repo.delete_quest(id).await?;
        if deleted {
            tracing::info!(quest_id = %id, "Quest deleted");
        }
        Ok(deleted)
    }
}
