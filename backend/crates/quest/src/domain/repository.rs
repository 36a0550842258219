//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the infra layer.
//!
//! Every operation that touches more than one row is a single method here, so
//! the implementation can run it as one transaction and the use cases stay
//! storage-agnostic.

use chrono::{DateTime, Utc};
use kernel::id::{PrizeId, QuestId, SeekerId, SuggestionId};

use crate::domain::entities::{
    Approval, Prize, Quest, QuestCompletion, QuestHistoryEntry, QuestSuggestion,
    RedemptionReceipt, RedemptionRecord, Seeker, SeekerChanges,
};
use crate::domain::value_objects::{CertificateId, Stars};
use crate::error::QuestResult;

#[trait_variant::make(SeekerRepository: Send)]
pub trait LocalSeekerRepository {
    async fn list_seekers(&self) -> QuestResult<Vec<Seeker>>;

    async fn find_seeker(&self, id: &SeekerId) -> QuestResult<Option<Seeker>>;

    async fn create_seeker(&self, seeker: &Seeker) -> QuestResult<()>;

    /// Writes only the fields set in `changes`, in one step.
    /// Returns `None` when no such seeker exists.
    async fn update_seeker(
        &self,
        id: &SeekerId,
        changes: &SeekerChanges,
    ) -> QuestResult<Option<Seeker>>;

    async fn delete_seeker(&self, id: &SeekerId) -> QuestResult<bool>;
}

#[trait_variant::make(QuestRepository: Send)]
pub trait LocalQuestRepository {
    /// Newest first
    async fn list_quests(&self) -> QuestResult<Vec<Quest>>;

    async fn find_quest(&self, id: &QuestId) -> QuestResult<Option<Quest>>;

    /// Open quests (`active`, `in_progress`, `pending`) the seeker may work on
    async fn list_quests_for_seeker(&self, seeker: &SeekerId) -> QuestResult<Vec<Quest>>;

    /// Completed quests, most recently completed first
    async fn quest_history(&self) -> QuestResult<Vec<QuestHistoryEntry>>;

    async fn create_quest(&self, quest: &Quest) -> QuestResult<()>;

    /// Overwrites editable fields of a quest that is not completed.
    /// Returns `false` when no such quest exists.
    async fn update_quest(&self, quest: &Quest) -> QuestResult<bool>;

    /// Fails with `QuestCompleted` for completed quests.
    /// Returns `false` when no such quest exists.
    async fn delete_quest(&self, id: &QuestId) -> QuestResult<bool>;

    /// `active -> in_progress`, records `started_at`
    async fn start_quest(
        &self,
        id: &QuestId,
        seeker: &SeekerId,
        now: DateTime<Utc>,
    ) -> QuestResult<Quest>;

    /// `in_progress -> pending` plus a pending completion request, atomically
    async fn submit_completion(
        &self,
        id: &QuestId,
        seeker: &SeekerId,
        now: DateTime<Utc>,
    ) -> QuestResult<(Quest, QuestCompletion)>;

    /// `pending -> completed` and the star credit, atomically and at most once
    async fn approve_quest(
        &self,
        id: &QuestId,
        seeker: Option<&SeekerId>,
        now: DateTime<Utc>,
    ) -> QuestResult<Approval>;

    /// `pending -> in_progress`, clears the completion
    async fn reject_quest(&self, id: &QuestId) -> QuestResult<Quest>;
}

#[trait_variant::make(SuggestionRepository: Send)]
pub trait LocalSuggestionRepository {
    /// Newest first
    async fn list_suggestions(&self) -> QuestResult<Vec<QuestSuggestion>>;

    async fn find_suggestion(&self, id: &SuggestionId) -> QuestResult<Option<QuestSuggestion>>;

    async fn create_suggestion(&self, suggestion: &QuestSuggestion) -> QuestResult<()>;

    /// Only pending suggestions are editable.
    /// Returns `false` when no such suggestion exists.
    async fn update_suggestion(&self, suggestion: &QuestSuggestion) -> QuestResult<bool>;

    /// `pending -> approved` and the new quest, atomically
    async fn approve_suggestion(
        &self,
        id: &SuggestionId,
        quest_id: &QuestId,
        now: DateTime<Utc>,
    ) -> QuestResult<(QuestSuggestion, Quest)>;

    /// `pending -> rejected`
    async fn reject_suggestion(&self, id: &SuggestionId) -> QuestResult<QuestSuggestion>;
}

#[trait_variant::make(PrizeRepository: Send)]
pub trait LocalPrizeRepository {
    async fn list_prizes(&self, include_unavailable: bool) -> QuestResult<Vec<Prize>>;

    async fn find_prize(&self, id: &PrizeId) -> QuestResult<Option<Prize>>;

    async fn create_prize(&self, prize: &Prize) -> QuestResult<()>;

    async fn update_prize(&self, prize: &Prize) -> QuestResult<bool>;

    /// Fails with `PrizeHasRedemptions` once the prize was ever redeemed.
    /// Returns `false` when no such prize exists.
    async fn delete_prize(&self, id: &PrizeId) -> QuestResult<bool>;
}

#[trait_variant::make(RedemptionRepository: Send)]
pub trait LocalRedemptionRepository {
    /// Debit the seeker and record the redemption, atomically.
    ///
    /// The prize row is the source of truth for the cost; `expected_cost`,
    /// when given, must match it.
    async fn redeem(
        &self,
        prize_id: &PrizeId,
        seeker_id: &SeekerId,
        expected_cost: Option<Stars>,
        certificate: CertificateId,
        now: DateTime<Utc>,
    ) -> QuestResult<RedemptionReceipt>;

    /// Newest first
    async fn list_redemptions(&self) -> QuestResult<Vec<RedemptionRecord>>;

    async fn list_redemptions_for_seeker(
        &self,
        seeker: &SeekerId,
    ) -> QuestResult<Vec<RedemptionRecord>>;
}

/// Everything the HTTP layer needs from one storage backend
pub trait QuestStore:
    SeekerRepository
    + QuestRepository
    + SuggestionRepository
    + PrizeRepository
    + RedemptionRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> QuestStore for T where
    T: SeekerRepository
        + QuestRepository
        + SuggestionRepository
        + PrizeRepository
        + RedemptionRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}
