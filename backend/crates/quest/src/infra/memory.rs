//! In-Memory Repository Implementation
//!
//! Backs the test-suite and local demos. A single `tokio::sync::Mutex`
//! guards all collections, so every method is trivially atomic, which mirrors
//! the transactional guarantees of the Postgres implementation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::{CompletionId, PrizeId, QuestId, RedemptionId, SeekerId, SuggestionId};
use tokio::sync::Mutex;

use crate::domain::entities::{
    Approval, Prize, PrizeRedemption, Quest, QuestCompletion, QuestHistoryEntry, QuestSuggestion,
    RedemptionReceipt, RedemptionRecord, Seeker, SeekerChanges,
};
use crate::domain::repository::{
    PrizeRepository, QuestRepository, RedemptionRepository, SeekerRepository,
    SuggestionRepository,
};
use crate::domain::value_objects::{
    CertificateId, CompletionStatus, QuestStatus, Stars, SuggestionStatus,
};
use crate::error::{QuestError, QuestResult};

#[derive(Debug, Default)]
struct Tables {
    seekers: Vec<Seeker>,
    quests: Vec<Quest>,
    suggestions: Vec<QuestSuggestion>,
    prizes: Vec<Prize>,
    redemptions: Vec<PrizeRedemption>,
    completions: Vec<QuestCompletion>,
}

impl Tables {
    fn seeker_mut(&mut self, id: &SeekerId) -> Option<&mut Seeker> {
        self.seekers.iter_mut().find(|s| &s.id == id)
    }

    fn seeker_name(&self, id: &SeekerId) -> Option<String> {
        self.seekers
            .iter()
            .find(|s| &s.id == id)
            .map(|s| s.name.clone())
    }

    fn quest_mut(&mut self, id: &QuestId) -> QuestResult<&mut Quest> {
        self.quests
            .iter_mut()
            .find(|q| &q.id == id)
            .ok_or(QuestError::QuestNotFound)
    }

    fn pending_suggestion_mut(&mut self, id: &SuggestionId) -> QuestResult<&mut QuestSuggestion> {
        let suggestion = self
            .suggestions
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or(QuestError::SuggestionNotFound)?;
        if suggestion.status != SuggestionStatus::Pending {
            return Err(QuestError::SuggestionReviewed);
        }
        Ok(suggestion)
    }

    /// Close the open completion request of a quest
    fn settle_completions(&mut self, quest_id: &QuestId, status: CompletionStatus) {
        self.completions
            .iter_mut()
            .filter(|c| &c.quest_id == quest_id && c.status == CompletionStatus::Pending)
            .for_each(|c| c.status = status);
    }

    fn record(&self, redemption: &PrizeRedemption) -> RedemptionRecord {
        RedemptionRecord {
            redemption: redemption.clone(),
            prize_name: self
                .prizes
                .iter()
                .find(|p| p.id == redemption.prize_id)
                .map(|p| p.name.clone()),
            seeker_name: self.seeker_name(&redemption.seeker_id),
        }
    }
}

/// Mutex-guarded in-memory store
#[derive(Clone, Default)]
pub struct MemoryQuestRepository {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryQuestRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SeekerRepository for MemoryQuestRepository {
    async fn list_seekers(&self) -> QuestResult<Vec<Seeker>> {
        Ok(self.tables.lock().await.seekers.clone())
    }

    async fn find_seeker(&self, id: &SeekerId) -> QuestResult<Option<Seeker>> {
        let tables = self.tables.lock().await;
        Ok(tables.seekers.iter().find(|s| &s.id == id).cloned())
    }

    async fn create_seeker(&self, seeker: &Seeker) -> QuestResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.seekers.iter().any(|s| s.id == seeker.id) {
            return Err(QuestError::AlreadyExists("Seeker"));
        }
        tables.seekers.push(seeker.clone());
        Ok(())
    }

    async fn update_seeker(
        &self,
        id: &SeekerId,
        changes: &SeekerChanges,
    ) -> QuestResult<Option<Seeker>> {
        let mut tables = self.tables.lock().await;
        let Some(seeker) = tables.seeker_mut(id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            seeker.name = name.clone();
        }
        if let Some(pin) = &changes.pin {
            seeker.pin = pin.clone();
        }
        if let Some(avatar_url) = &changes.avatar_url {
            seeker.avatar_url = avatar_url.clone();
        }
        if let Some(stars) = changes.stars {
            seeker.stars = stars;
        }
        Ok(Some(seeker.clone()))
    }

    async fn delete_seeker(&self, id: &SeekerId) -> QuestResult<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.seekers.len();
        tables.seekers.retain(|s| &s.id != id);
        Ok(tables.seekers.len() != before)
    }
}

impl QuestRepository for MemoryQuestRepository {
    async fn list_quests(&self) -> QuestResult<Vec<Quest>> {
        let mut quests = self.tables.lock().await.quests.clone();
        quests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(quests)
    }

    async fn find_quest(&self, id: &QuestId) -> QuestResult<Option<Quest>> {
        let tables = self.tables.lock().await;
        Ok(tables.quests.iter().find(|q| &q.id == id).cloned())
    }

    async fn list_quests_for_seeker(&self, seeker: &SeekerId) -> QuestResult<Vec<Quest>> {
        let tables = self.tables.lock().await;
        let mut quests: Vec<Quest> = tables
            .quests
            .iter()
            .filter(|q| q.status.is_open() && q.assigned_to.admits(seeker))
            .cloned()
            .collect();
        quests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(quests)
    }

    async fn quest_history(&self) -> QuestResult<Vec<QuestHistoryEntry>> {
        let tables = self.tables.lock().await;
        let mut history: Vec<QuestHistoryEntry> = tables
            .quests
            .iter()
            .filter(|q| q.status == QuestStatus::Completed)
            .map(|q| QuestHistoryEntry {
                quest: q.clone(),
                seeker_name: q
                    .completed_by
                    .as_ref()
                    .and_then(|id| tables.seeker_name(id)),
            })
            .collect();
        history.sort_by(|a, b| b.quest.completed_at.cmp(&a.quest.completed_at));
        Ok(history)
    }

    async fn create_quest(&self, quest: &Quest) -> QuestResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.quests.iter().any(|q| q.id == quest.id) {
            return Err(QuestError::AlreadyExists("Quest"));
        }
        tables.quests.push(quest.clone());
        Ok(())
    }

    async fn update_quest(&self, quest: &Quest) -> QuestResult<bool> {
        let mut tables = self.tables.lock().await;
        let Ok(existing) = tables.quest_mut(&quest.id) else {
            return Ok(false);
        };
        if existing.status == QuestStatus::Completed {
            return Ok(false);
        }
        existing.title = quest.title.clone();
        existing.description = quest.description.clone();
        existing.reward = quest.reward;
        existing.duration = quest.duration;
        existing.assigned_to = quest.assigned_to.clone();
        Ok(true)
    }

    async fn delete_quest(&self, id: &QuestId) -> QuestResult<bool> {
        let mut tables = self.tables.lock().await;
        let status = tables.quests.iter().find(|q| &q.id == id).map(|q| q.status);
        match status {
            None => Ok(false),
            Some(QuestStatus::Completed) => Err(QuestError::QuestCompleted),
            Some(_) => {
                tables.quests.retain(|q| &q.id != id);
                Ok(true)
            }
        }
    }

    async fn start_quest(
        &self,
        id: &QuestId,
        seeker: &SeekerId,
        now: DateTime<Utc>,
    ) -> QuestResult<Quest> {
        let mut tables = self.tables.lock().await;
        let quest = tables.quest_mut(id)?;
        quest.ensure_startable(seeker)?;

        quest.status = QuestStatus::InProgress;
        quest.started_at = Some(now);
        quest.completed_at = None;
        quest.completed_by = None;
        Ok(quest.clone())
    }

    async fn submit_completion(
        &self,
        id: &QuestId,
        seeker: &SeekerId,
        now: DateTime<Utc>,
    ) -> QuestResult<(Quest, QuestCompletion)> {
        let mut tables = self.tables.lock().await;

        let duplicate = tables.completions.iter().any(|c| {
            &c.quest_id == id && &c.seeker_id == seeker && c.status == CompletionStatus::Pending
        });

        let quest = tables.quest_mut(id)?;
        quest.ensure_completable(seeker, now)?;
        if duplicate {
            return Err(QuestError::DuplicateCompletion);
        }

        quest.status = QuestStatus::Pending;
        quest.completed_at = Some(now);
        quest.completed_by = Some(seeker.clone());
        let quest = quest.clone();

        let completion = QuestCompletion {
            id: CompletionId::new(),
            quest_id: id.clone(),
            seeker_id: seeker.clone(),
            status: CompletionStatus::Pending,
            completed_at: now,
        };
        tables.completions.push(completion.clone());
        Ok((quest, completion))
    }

    async fn approve_quest(
        &self,
        id: &QuestId,
        seeker: Option<&SeekerId>,
        now: DateTime<Utc>,
    ) -> QuestResult<Approval> {
        let mut tables = self.tables.lock().await;

        let quest = tables.quest_mut(id)?;
        if quest.status != QuestStatus::Pending {
            return Err(QuestError::InvalidTransition {
                from: quest.status,
                action: "approve",
            });
        }
        let beneficiary = quest.beneficiary(seeker)?;
        let reward = quest.reward;

        // Validate everything before mutating anything
        let balance = tables
            .seeker_mut(&beneficiary)
            .ok_or(QuestError::SeekerNotFound)?;
        let stars = balance
            .stars
            .checked_add(reward)
            .ok_or_else(|| QuestError::Internal("star balance overflow".into()))?;
        balance.stars = stars;

        let quest = tables.quest_mut(id)?;
        quest.status = QuestStatus::Completed;
        quest.completed_at = Some(now);
        quest.completed_by = Some(beneficiary.clone());
        let quest = quest.clone();

        tables.settle_completions(id, CompletionStatus::Approved);

        Ok(Approval {
            quest,
            seeker_id: beneficiary,
            stars,
        })
    }

    async fn reject_quest(&self, id: &QuestId) -> QuestResult<Quest> {
        let mut tables = self.tables.lock().await;

        let quest = tables.quest_mut(id)?;
        if quest.status != QuestStatus::Pending {
            return Err(QuestError::InvalidTransition {
                from: quest.status,
                action: "reject",
            });
        }
        quest.status = QuestStatus::InProgress;
        quest.completed_at = None;
        quest.completed_by = None;
        let quest = quest.clone();

        tables.settle_completions(id, CompletionStatus::Rejected);
        Ok(quest)
    }
}

impl SuggestionRepository for MemoryQuestRepository {
    async fn list_suggestions(&self) -> QuestResult<Vec<QuestSuggestion>> {
        let mut suggestions = self.tables.lock().await.suggestions.clone();
        suggestions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(suggestions)
    }

    async fn find_suggestion(&self, id: &SuggestionId) -> QuestResult<Option<QuestSuggestion>> {
        let tables = self.tables.lock().await;
        Ok(tables.suggestions.iter().find(|s| &s.id == id).cloned())
    }

    async fn create_suggestion(&self, suggestion: &QuestSuggestion) -> QuestResult<()> {
        self.tables.lock().await.suggestions.push(suggestion.clone());
        Ok(())
    }

    async fn update_suggestion(&self, suggestion: &QuestSuggestion) -> QuestResult<bool> {
        let mut tables = self.tables.lock().await;
        match tables.pending_suggestion_mut(&suggestion.id) {
            Ok(existing) => {
                existing.title = suggestion.title.clone();
                existing.description = suggestion.description.clone();
                existing.desired_reward = suggestion.desired_reward;
                existing.duration = suggestion.duration;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    async fn approve_suggestion(
        &self,
        id: &SuggestionId,
        quest_id: &QuestId,
        now: DateTime<Utc>,
    ) -> QuestResult<(QuestSuggestion, Quest)> {
        let mut tables = self.tables.lock().await;

        let suggestion = tables.pending_suggestion_mut(id)?;
        suggestion.status = SuggestionStatus::Approved;
        let suggestion = suggestion.clone();

        let quest = suggestion.to_quest(quest_id.clone(), now);
        tables.quests.push(quest.clone());
        Ok((suggestion, quest))
    }

    async fn reject_suggestion(&self, id: &SuggestionId) -> QuestResult<QuestSuggestion> {
        let mut tables = self.tables.lock().await;
        let suggestion = tables.pending_suggestion_mut(id)?;
        suggestion.status = SuggestionStatus::Rejected;
        Ok(suggestion.clone())
    }
}

impl PrizeRepository for MemoryQuestRepository {
    async fn list_prizes(&self, include_unavailable: bool) -> QuestResult<Vec<Prize>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .prizes
            .iter()
            .filter(|p| include_unavailable || p.available)
            .cloned()
            .collect())
    }

    async fn find_prize(&self, id: &PrizeId) -> QuestResult<Option<Prize>> {
        let tables = self.tables.lock().await;
        Ok(tables.prizes.iter().find(|p| &p.id == id).cloned())
    }

    async fn create_prize(&self, prize: &Prize) -> QuestResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.prizes.iter().any(|p| p.id == prize.id) {
            return Err(QuestError::AlreadyExists("Prize"));
        }
        tables.prizes.push(prize.clone());
        Ok(())
    }

    async fn update_prize(&self, prize: &Prize) -> QuestResult<bool> {
        let mut tables = self.tables.lock().await;
        match tables.prizes.iter_mut().find(|p| p.id == prize.id) {
            Some(existing) => {
                *existing = prize.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_prize(&self, id: &PrizeId) -> QuestResult<bool> {
        let mut tables = self.tables.lock().await;
        if !tables.prizes.iter().any(|p| &p.id == id) {
            return Ok(false);
        }
        if tables.redemptions.iter().any(|r| &r.prize_id == id) {
            return Err(QuestError::PrizeHasRedemptions);
        }
        tables.prizes.retain(|p| &p.id != id);
        Ok(true)
    }
}

impl RedemptionRepository for MemoryQuestRepository {
    async fn redeem(
        &self,
        prize_id: &PrizeId,
        seeker_id: &SeekerId,
        expected_cost: Option<Stars>,
        certificate: CertificateId,
        now: DateTime<Utc>,
    ) -> QuestResult<RedemptionReceipt> {
        let mut tables = self.tables.lock().await;

        let prize = tables
            .prizes
            .iter()
            .find(|p| &p.id == prize_id)
            .ok_or(QuestError::PrizeNotFound)?;
        if !prize.available {
            return Err(QuestError::PrizeUnavailable);
        }
        let cost = prize.stars_cost;
        if let Some(expected) = expected_cost.filter(|expected| *expected != cost) {
            return Err(QuestError::StarsCostMismatch {
                expected: expected.get(),
                actual: cost.get(),
            });
        }

        let seeker = tables
            .seeker_mut(seeker_id)
            .ok_or(QuestError::SeekerNotFound)?;
        let remaining = seeker
            .stars
            .checked_sub(cost)
            .ok_or(QuestError::InsufficientStars)?;
        seeker.stars = remaining;

        let redemption = PrizeRedemption {
            id: RedemptionId::new(),
            prize_id: prize_id.clone(),
            seeker_id: seeker_id.clone(),
            redeemed_at: now,
            certificate_id: certificate,
            stars_cost: cost,
        };
        tables.redemptions.push(redemption.clone());

        Ok(RedemptionReceipt {
            redemption,
            remaining_stars: remaining,
        })
    }

    async fn list_redemptions(&self) -> QuestResult<Vec<RedemptionRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .redemptions
            .iter()
            .rev()
            .map(|r| tables.record(r))
            .collect())
    }

    async fn list_redemptions_for_seeker(
        &self,
        seeker: &SeekerId,
    ) -> QuestResult<Vec<RedemptionRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .redemptions
            .iter()
            .rev()
            .filter(|r| &r.seeker_id == seeker)
            .map(|r| tables.record(r))
            .collect())
    }
}
