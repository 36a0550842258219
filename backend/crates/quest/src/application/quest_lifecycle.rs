//! Quest Lifecycle Use Case
//!
//! Drives a quest through `active -> in_progress -> pending -> completed`
//! (and back to `in_progress` on reject). Every transition is a conditional
//! write in the repository, so concurrent requests cannot apply the same
//! transition twice.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::{QuestId, SeekerId};

use crate::domain::entities::{Approval, Quest, QuestCompletion};
use crate::domain::repository::QuestRepository;
use crate::error::QuestResult;

pub struct QuestLifecycleUseCase<R>
where
    R: QuestRepository,
{
    repo: Arc<R>,
}

impl<R> QuestLifecycleUseCase<R>
where
    R: QuestRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn start(&self, id: &QuestId, seeker: &SeekerId) -> QuestResult<Quest> {
        self.start_at(id, seeker, Utc::now()).await
    }

    pub async fn start_at(
        &self,
        id: &QuestId,
        seeker: &SeekerId,
        now: DateTime<Utc>,
    ) -> QuestResult<Quest> {
        let quest = self.repo.start_quest(id, seeker, now).await?;
        tracing::info!(quest_id = %id, seeker_id = %seeker, "Quest started");
        Ok(quest)
    }

    /// Hand a quest in for review
    pub async fn complete(
        &self,
        id: &QuestId,
        seeker: &SeekerId,
    ) -> QuestResult<(Quest, QuestCompletion)> {
        self.complete_at(id, seeker, Utc::now()).await
    }

    /// Same as [`complete`](Self::complete) with an explicit clock
    pub async fn complete_at(
        &self,
        id: &QuestId,
        seeker: &SeekerId,
        now: DateTime<Utc>,
    ) -> QuestResult<(Quest, QuestCompletion)> {
        let (quest, completion) = self.repo.submit_completion(id, seeker, now).await?;
        tracing::info!(
            quest_id = %id,
            seeker_id = %seeker,
            completion_id = %completion.id,
            "Quest completion submitted"
        );
        Ok((quest, completion))
    }

    /// Credit the reward; `seeker` defaults to whoever handed the quest in
    pub async fn approve(&self, id: &QuestId, seeker: Option<&SeekerId>) -> QuestResult<Approval> {
        let approval = self.repo.approve_quest(id, seeker, Utc::now()).await?;
        tracing::info!(
            quest_id = %id,
            seeker_id = %approval.seeker_id,
            reward = approval.quest.reward.get(),
            stars = approval.stars.get(),
            "Quest approved"
        );
        Ok(approval)
    }

    pub async fn reject(&self, id: &QuestId) -> QuestResult<Quest> {
        let quest = self.repo.reject_quest(id).await?;
        tracing::info!(quest_id = %id, "Quest completion rejected");
        Ok(quest)
    }
}
