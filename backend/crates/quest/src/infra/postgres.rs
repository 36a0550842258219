//! PostgreSQL Repository Implementations
//!
//! Multi-row operations run inside an `sqlx::Transaction`. Returning early
//! with `?` drops the transaction, which rolls it back and hands the
//! connection back to the pool.

use chrono::{DateTime, Utc};
use kernel::id::{CompletionId, PrizeId, QuestId, RedemptionId, SeekerId, SuggestionId};
use sqlx::{PgExecutor, PgPool};

use crate::domain::entities::{
    Approval, Prize, PrizeRedemption, Quest, QuestCompletion, QuestHistoryEntry, QuestSuggestion,
    RedemptionReceipt, RedemptionRecord, Seeker, SeekerChanges,
};
use crate::domain::repository::{
    PrizeRepository, QuestRepository, RedemptionRepository, SeekerRepository,
    SuggestionRepository,
};
use crate::domain::value_objects::{
    Assignees, CertificateId, CompletionStatus, QuestDuration, QuestStatus, SeekerPin, Stars,
    SuggestionStatus,
};
use crate::error::{QuestError, QuestResult};

const SEEKER_COLUMNS: &str = "id, name, pin, avatar_url, stars";
const QUEST_COLUMNS: &str = "id, title, description, reward, status, duration, assigned_to, \
                             started_at, completed_at, completed_by, created_at";
const SUGGESTION_COLUMNS: &str =
    "id, title, description, suggested_by, status, desired_reward, duration, created_at";
const PRIZE_COLUMNS: &str = "id, name, description, stars_cost, image_url, available";
const RECORD_SELECT: &str = r#"
    SELECT
        r.id, r.prize_id, r.seeker_id, r.redeemed_at, r.certificate_id, r.stars_cost,
        p.name AS prize_name,
        s.name AS seeker_name
    FROM prize_redemptions r
    LEFT JOIN prizes p ON p.id = r.prize_id
    LEFT JOIN seekers s ON s.id = r.seeker_id
"#;

/// PostgreSQL-backed repository
#[derive(Clone)]
pub struct PgQuestRepository {
    pool: PgPool,
}

impl PgQuestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Round-trip to the database, used by the health endpoint
    pub async fn ping(&self) -> QuestResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Explain why a conditional quest update matched no row
    async fn transition_failure(&self, id: &QuestId, action: &'static str) -> QuestError {
        match self.find_quest(id).await {
            Ok(Some(quest)) => QuestError::InvalidTransition {
                from: quest.status,
                action,
            },
            Ok(None) => QuestError::QuestNotFound,
            Err(e) => e,
        }
    }

    /// Explain why a conditional suggestion update matched no row
    async fn review_failure(&self, id: &SuggestionId) -> QuestError {
        match self.find_suggestion(id).await {
            Ok(Some(_)) => QuestError::SuggestionReviewed,
            Ok(None) => QuestError::SuggestionNotFound,
            Err(e) => e,
        }
    }
}

async fn insert_quest<'e, E>(executor: E, quest: &Quest) -> QuestResult<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO quests (
            id, title, description, reward, status, duration,
            assigned_to, started_at, completed_at, completed_by, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(quest.id.as_str())
    .bind(&quest.title)
    .bind(&quest.description)
    .bind(quest.reward.get())
    .bind(quest.status.as_str())
    .bind(quest.duration.as_str())
    .bind(quest.assigned_to.to_db())
    .bind(quest.started_at)
    .bind(quest.completed_at)
    .bind(quest.completed_by.as_ref().map(|id| id.as_str()))
    .bind(quest.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

impl SeekerRepository for PgQuestRepository {
    async fn list_seekers(&self) -> QuestResult<Vec<Seeker>> {
        sqlx::query_as::<_, SeekerRow>(&format!(
            "SELECT {SEEKER_COLUMNS} FROM seekers ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(SeekerRow::into_seeker)
        .collect()
    }

    async fn find_seeker(&self, id: &SeekerId) -> QuestResult<Option<Seeker>> {
        sqlx::query_as::<_, SeekerRow>(&format!(
            "SELECT {SEEKER_COLUMNS} FROM seekers WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(SeekerRow::into_seeker)
        .transpose()
    }

    async fn create_seeker(&self, seeker: &Seeker) -> QuestResult<()> {
        sqlx::query(
            "INSERT INTO seekers (id, name, pin, avatar_url, stars) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(seeker.id.as_str())
        .bind(&seeker.name)
        .bind(seeker.pin.as_str())
        .bind(&seeker.avatar_url)
        .bind(seeker.stars.get())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_seeker(
        &self,
        id: &SeekerId,
        changes: &SeekerChanges,
    ) -> QuestResult<Option<Seeker>> {
        // Unset fields keep the column value as of this statement
        sqlx::query_as::<_, SeekerRow>(&format!(
            r#"
            UPDATE seekers
            SET name = COALESCE($2, name),
                pin = COALESCE($3, pin),
                avatar_url = COALESCE($4, avatar_url),
                stars = COALESCE($5, stars)
            WHERE id = $1
            RETURNING {SEEKER_COLUMNS}
            "#
        ))
        .bind(id.as_str())
        .bind(changes.name.as_deref())
        .bind(changes.pin.as_ref().map(|pin| pin.as_str()))
        .bind(changes.avatar_url.as_deref())
        .bind(changes.stars.map(|stars| stars.get()))
        .fetch_optional(&self.pool)
        .await?
        .map(SeekerRow::into_seeker)
        .transpose()
    }

    async fn delete_seeker(&self, id: &SeekerId) -> QuestResult<bool> {
        let deleted = sqlx::query("DELETE FROM seekers WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }
}

impl QuestRepository for PgQuestRepository {
    async fn list_quests(&self) -> QuestResult<Vec<Quest>> {
        sqlx::query_as::<_, QuestRow>(&format!(
            "SELECT {QUEST_COLUMNS} FROM quests ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(QuestRow::into_quest)
        .collect()
    }

    async fn find_quest(&self, id: &QuestId) -> QuestResult<Option<Quest>> {
        sqlx::query_as::<_, QuestRow>(&format!(
            "SELECT {QUEST_COLUMNS} FROM quests WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(QuestRow::into_quest)
        .transpose()
    }

    async fn list_quests_for_seeker(&self, seeker: &SeekerId) -> QuestResult<Vec<Quest>> {
        sqlx::query_as::<_, QuestRow>(&format!(
            r#"
            SELECT {QUEST_COLUMNS} FROM quests
            WHERE status IN ('active', 'in_progress', 'pending')
              AND (cardinality(assigned_to) = 0 OR $1 = ANY(assigned_to))
            ORDER BY created_at DESC, id
            "#
        ))
        .bind(seeker.as_str())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(QuestRow::into_quest)
        .collect()
    }

    async fn quest_history(&self) -> QuestResult<Vec<QuestHistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT
                q.id, q.title, q.description, q.reward, q.status, q.duration,
                q.assigned_to, q.started_at, q.completed_at, q.completed_by, q.created_at,
                s.name AS seeker_name
            FROM quests q
            LEFT JOIN seekers s ON s.id = q.completed_by
            WHERE q.status = 'completed'
            ORDER BY q.completed_at DESC NULLS LAST, q.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(QuestHistoryEntry {
                    quest: row.quest.into_quest()?,
                    seeker_name: row.seeker_name,
                })
            })
            .collect()
    }

    async fn create_quest(&self, quest: &Quest) -> QuestResult<()> {
        insert_quest(&self.pool, quest).await
    }

    async fn update_quest(&self, quest: &Quest) -> QuestResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE quests
            SET title = $2, description = $3, reward = $4, duration = $5, assigned_to = $6
            WHERE id = $1 AND status <> 'completed'
            "#,
        )
        .bind(quest.id.as_str())
        .bind(&quest.title)
        .bind(&quest.description)
        .bind(quest.reward.get())
        .bind(quest.duration.as_str())
        .bind(quest.assigned_to.to_db())
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(updated == 1)
    }

    async fn delete_quest(&self, id: &QuestId) -> QuestResult<bool> {
        let deleted = sqlx::query("DELETE FROM quests WHERE id = $1 AND status <> 'completed'")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();
        if deleted > 0 {
            return Ok(true);
        }

        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM quests WHERE id = $1)")
                .bind(id.as_str())
                .fetch_one(&self.pool)
                .await?;
        if exists {
            return Err(QuestError::QuestCompleted);
        }
        Ok(false)
    }

    async fn start_quest(
        &self,
        id: &QuestId,
        seeker: &SeekerId,
        now: DateTime<Utc>,
    ) -> QuestResult<Quest> {
        let row = sqlx::query_as::<_, QuestRow>(&format!(
            r#"
            UPDATE quests
            SET status = 'in_progress', started_at = $3, completed_at = NULL, completed_by = NULL
            WHERE id = $1
              AND status = 'active'
              AND (cardinality(assigned_to) = 0 OR $2 = ANY(assigned_to))
            RETURNING {QUEST_COLUMNS}
            "#
        ))
        .bind(id.as_str())
        .bind(seeker.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.into_quest(),
            None => {
                let quest = self
                    .find_quest(id)
                    .await?
                    .ok_or(QuestError::QuestNotFound)?;
                quest.ensure_startable(seeker)?;
                // Raced with another start
                Err(QuestError::InvalidTransition {
                    from: QuestStatus::InProgress,
                    action: "start",
                })
            }
        }
    }

    async fn submit_completion(
        &self,
        id: &QuestId,
        seeker: &SeekerId,
        now: DateTime<Utc>,
    ) -> QuestResult<(Quest, QuestCompletion)> {
        let mut tx = self.pool.begin().await?;

        let quest = sqlx::query_as::<_, QuestRow>(&format!(
            "SELECT {QUEST_COLUMNS} FROM quests WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(QuestError::QuestNotFound)?
        .into_quest()?;

        quest.ensure_completable(seeker, now)?;

        let completion = QuestCompletion {
            id: CompletionId::new(),
            quest_id: id.clone(),
            seeker_id: seeker.clone(),
            status: CompletionStatus::Pending,
            completed_at: now,
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO quest_completions (id, quest_id, seeker_id, status, completed_at)
            VALUES ($1, $2, $3, 'pending', $4)
            ON CONFLICT (quest_id, seeker_id) WHERE status = 'pending' DO NOTHING
            "#,
        )
        .bind(completion.id.as_str())
        .bind(id.as_str())
        .bind(seeker.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            tracing::warn!(quest_id = %id, seeker_id = %seeker, "Duplicate completion request");
            return Err(QuestError::DuplicateCompletion);
        }

        let quest = sqlx::query_as::<_, QuestRow>(&format!(
            r#"
            UPDATE quests
            SET status = 'pending', completed_at = $2, completed_by = $3
            WHERE id = $1 AND status = 'in_progress'
            RETURNING {QUEST_COLUMNS}
            "#
        ))
        .bind(id.as_str())
        .bind(now)
        .bind(seeker.as_str())
        .fetch_one(&mut *tx)
        .await?
        .into_quest()?;

        tx.commit().await?;
        Ok((quest, completion))
    }

    async fn approve_quest(
        &self,
        id: &QuestId,
        seeker: Option<&SeekerId>,
        now: DateTime<Utc>,
    ) -> QuestResult<Approval> {
        let mut tx = self.pool.begin().await?;

        // Concurrent approvals queue on the row lock; the loser sees `completed`
        let pending = sqlx::query_as::<_, QuestRow>(&format!(
            "SELECT {QUEST_COLUMNS} FROM quests WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(QuestError::QuestNotFound)?
        .into_quest()?;

        if pending.status != QuestStatus::Pending {
            return Err(QuestError::InvalidTransition {
                from: pending.status,
                action: "approve",
            });
        }
        let beneficiary = pending.beneficiary(seeker)?;

        let quest = sqlx::query_as::<_, QuestRow>(&format!(
            r#"
            UPDATE quests
            SET status = 'completed', completed_at = $2, completed_by = $3
            WHERE id = $1 AND status = 'pending'
            RETURNING {QUEST_COLUMNS}
            "#
        ))
        .bind(id.as_str())
        .bind(now)
        .bind(beneficiary.as_str())
        .fetch_one(&mut *tx)
        .await?
        .into_quest()?;

        let stars = sqlx::query_scalar::<_, i32>(
            "UPDATE seekers SET stars = stars + $2 WHERE id = $1 RETURNING stars",
        )
        .bind(beneficiary.as_str())
        .bind(quest.reward.get())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(QuestError::SeekerNotFound)?;

        sqlx::query(
            "UPDATE quest_completions SET status = 'approved' WHERE quest_id = $1 AND status = 'pending'",
        )
        .bind(id.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Approval {
            quest,
            seeker_id: beneficiary,
            stars: Stars::new(stars).ok_or_else(|| corrupt("seekers.stars"))?,
        })
    }

    async fn reject_quest(&self, id: &QuestId) -> QuestResult<Quest> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, QuestRow>(&format!(
            r#"
            UPDATE quests
            SET status = 'in_progress', completed_at = NULL, completed_by = NULL
            WHERE id = $1 AND status = 'pending'
            RETURNING {QUEST_COLUMNS}
            "#
        ))
        .bind(id.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            drop(tx);
            return Err(self.transition_failure(id, "reject").await);
        };

        sqlx::query(
            "UPDATE quest_completions SET status = 'rejected' WHERE quest_id = $1 AND status = 'pending'",
        )
        .bind(id.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        row.into_quest()
    }
}

impl SuggestionRepository for PgQuestRepository {
    async fn list_suggestions(&self) -> QuestResult<Vec<QuestSuggestion>> {
        sqlx::query_as::<_, SuggestionRow>(&format!(
            "SELECT {SUGGESTION_COLUMNS} FROM quest_suggestions ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(SuggestionRow::into_suggestion)
        .collect()
    }

    async fn find_suggestion(&self, id: &SuggestionId) -> QuestResult<Option<QuestSuggestion>> {
        sqlx::query_as::<_, SuggestionRow>(&format!(
            "SELECT {SUGGESTION_COLUMNS} FROM quest_suggestions WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(SuggestionRow::into_suggestion)
        .transpose()
    }

    async fn create_suggestion(&self, suggestion: &QuestSuggestion) -> QuestResult<()> {
        sqlx::query(
            r#"
            INSERT INTO quest_suggestions (
                id, title, description, suggested_by, status, desired_reward, duration, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(suggestion.id.as_str())
        .bind(&suggestion.title)
        .bind(&suggestion.description)
        .bind(suggestion.suggested_by.as_str())
        .bind(suggestion.status.as_str())
        .bind(suggestion.desired_reward.get())
        .bind(suggestion.duration.as_str())
        .bind(suggestion.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_suggestion(&self, suggestion: &QuestSuggestion) -> QuestResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE quest_suggestions
            SET title = $2, description = $3, desired_reward = $4, duration = $5
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(suggestion.id.as_str())
        .bind(&suggestion.title)
        .bind(&suggestion.description)
        .bind(suggestion.desired_reward.get())
        .bind(suggestion.duration.as_str())
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(updated == 1)
    }

    async fn approve_suggestion(
        &self,
        id: &SuggestionId,
        quest_id: &QuestId,
        now: DateTime<Utc>,
    ) -> QuestResult<(QuestSuggestion, Quest)> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, SuggestionRow>(&format!(
            r#"
            UPDATE quest_suggestions SET status = 'approved'
            WHERE id = $1 AND status = 'pending'
            RETURNING {SUGGESTION_COLUMNS}
            "#
        ))
        .bind(id.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            drop(tx);
            return Err(self.review_failure(id).await);
        };
        let suggestion = row.into_suggestion()?;

        let quest = suggestion.to_quest(quest_id.clone(), now);
        insert_quest(&mut *tx, &quest).await?;

        tx.commit().await?;
        Ok((suggestion, quest))
    }

    async fn reject_suggestion(&self, id: &SuggestionId) -> QuestResult<QuestSuggestion> {
        let row = sqlx::query_as::<_, SuggestionRow>(&format!(
            r#"
            UPDATE quest_suggestions SET status = 'rejected'
            WHERE id = $1 AND status = 'pending'
            RETURNING {SUGGESTION_COLUMNS}
            "#
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.into_suggestion(),
            None => Err(self.review_failure(id).await),
        }
    }
}

impl PrizeRepository for PgQuestRepository {
    async fn list_prizes(&self, include_unavailable: bool) -> QuestResult<Vec<Prize>> {
        sqlx::query_as::<_, PrizeRow>(&format!(
            "SELECT {PRIZE_COLUMNS} FROM prizes WHERE ($1 OR available) ORDER BY created_at, id"
        ))
        .bind(include_unavailable)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(PrizeRow::into_prize)
        .collect()
    }

    async fn find_prize(&self, id: &PrizeId) -> QuestResult<Option<Prize>> {
        sqlx::query_as::<_, PrizeRow>(&format!(
            "SELECT {PRIZE_COLUMNS} FROM prizes WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(PrizeRow::into_prize)
        .transpose()
    }

    async fn create_prize(&self, prize: &Prize) -> QuestResult<()> {
        sqlx::query(
            r#"
            INSERT INTO prizes (id, name, description, stars_cost, image_url, available)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(prize.id.as_str())
        .bind(&prize.name)
        .bind(&prize.description)
        .bind(prize.stars_cost.get())
        .bind(prize.image_url.as_deref())
        .bind(prize.available)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_prize(&self, prize: &Prize) -> QuestResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE prizes
            SET name = $2, description = $3, stars_cost = $4, image_url = $5, available = $6
            WHERE id = $1
            "#,
        )
        .bind(prize.id.as_str())
        .bind(&prize.name)
        .bind(&prize.description)
        .bind(prize.stars_cost.get())
        .bind(prize.image_url.as_deref())
        .bind(prize.available)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(updated == 1)
    }

    async fn delete_prize(&self, id: &PrizeId) -> QuestResult<bool> {
        let mut tx = self.pool.begin().await?;

        // Lock the prize so a concurrent redemption cannot slip in
        let locked = sqlx::query_scalar::<_, String>("SELECT id FROM prizes WHERE id = $1 FOR UPDATE")
            .bind(id.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Ok(false);
        }

        let redemptions = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM prize_redemptions WHERE prize_id = $1",
        )
        .bind(id.as_str())
        .fetch_one(&mut *tx)
        .await?;
        if redemptions > 0 {
            tracing::warn!(prize_id = %id, redemptions, "Refusing to delete redeemed prize");
            return Err(QuestError::PrizeHasRedemptions);
        }

        sqlx::query("DELETE FROM prizes WHERE id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}

impl RedemptionRepository for PgQuestRepository {
    async fn redeem(
        &self,
        prize_id: &PrizeId,
        seeker_id: &SeekerId,
        expected_cost: Option<Stars>,
        certificate: CertificateId,
        now: DateTime<Utc>,
    ) -> QuestResult<RedemptionReceipt> {
        let mut tx = self.pool.begin().await?;

        let prize = sqlx::query_as::<_, PrizeRow>(&format!(
            "SELECT {PRIZE_COLUMNS} FROM prizes WHERE id = $1 FOR SHARE"
        ))
        .bind(prize_id.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(QuestError::PrizeNotFound)?
        .into_prize()?;

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

        // Check and debit in one statement; concurrent spenders serialize on the row
        let remaining = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE seekers SET stars = stars - $2
            WHERE id = $1 AND stars >= $2
            RETURNING stars
            "#,
        )
        .bind(seeker_id.as_str())
        .bind(cost.get())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(remaining) = remaining else {
            let exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM seekers WHERE id = $1)")
                    .bind(seeker_id.as_str())
                    .fetch_one(&mut *tx)
                    .await?;
            return Err(if exists {
                QuestError::InsufficientStars
            } else {
                QuestError::SeekerNotFound
            });
        };

        let redemption = PrizeRedemption {
            id: RedemptionId::new(),
            prize_id: prize_id.clone(),
            seeker_id: seeker_id.clone(),
            redeemed_at: now,
            certificate_id: certificate,
            stars_cost: cost,
        };

        sqlx::query(
            r#"
            INSERT INTO prize_redemptions (
                id, prize_id, seeker_id, redeemed_at, certificate_id, stars_cost
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(redemption.id.as_str())
        .bind(prize_id.as_str())
        .bind(seeker_id.as_str())
        .bind(now)
        .bind(redemption.certificate_id.as_str())
        .bind(cost.get())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(RedemptionReceipt {
            redemption,
            remaining_stars: Stars::new(remaining).ok_or_else(|| corrupt("seekers.stars"))?,
        })
    }

    async fn list_redemptions(&self) -> QuestResult<Vec<RedemptionRecord>> {
        sqlx::query_as::<_, RecordRow>(&format!(
            "{RECORD_SELECT} ORDER BY r.redeemed_at DESC, r.id"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(RecordRow::into_record)
        .collect()
    }

    async fn list_redemptions_for_seeker(
        &self,
        seeker: &SeekerId,
    ) -> QuestResult<Vec<RedemptionRecord>> {
        sqlx::query_as::<_, RecordRow>(&format!(
            "{RECORD_SELECT} WHERE r.seeker_id = $1 ORDER BY r.redeemed_at DESC, r.id"
        ))
        .bind(seeker.as_str())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(RecordRow::into_record)
        .collect()
    }
}

fn corrupt(column: &str) -> QuestError {
    QuestError::Internal(format!("unexpected value stored in {column}"))
}

// Internal row types for sqlx mapping
#[derive(sqlx::FromRow)]
struct SeekerRow {
    id: String,
    name: String,
    pin: String,
    avatar_url: String,
    stars: i32,
}

impl SeekerRow {
    fn into_seeker(self) -> QuestResult<Seeker> {
        Ok(Seeker {
            id: SeekerId::from_db(self.id),
            name: self.name,
            pin: SeekerPin::parse(&self.pin).ok_or_else(|| corrupt("seekers.pin"))?,
            avatar_url: self.avatar_url,
            stars: Stars::new(self.stars).ok_or_else(|| corrupt("seekers.stars"))?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct QuestRow {
    id: String,
    title: String,
    description: String,
    reward: i32,
    status: String,
    duration: String,
    assigned_to: Vec<String>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    completed_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl QuestRow {
    fn into_quest(self) -> QuestResult<Quest> {
        Ok(Quest {
            id: QuestId::from_db(self.id),
            title: self.title,
            description: self.description,
            reward: Stars::positive(self.reward).ok_or_else(|| corrupt("quests.reward"))?,
            status: QuestStatus::parse(&self.status).ok_or_else(|| corrupt("quests.status"))?,
            duration: QuestDuration::parse(&self.duration)
                .ok_or_else(|| corrupt("quests.duration"))?,
            assigned_to: Assignees::from_db(self.assigned_to),
            started_at: self.started_at,
            completed_at: self.completed_at,
            completed_by: self.completed_by.map(SeekerId::from_db),
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    #[sqlx(flatten)]
    quest: QuestRow,
    seeker_name: Option<String>,
}

#[derive(sqlx::FromRow)]
struct SuggestionRow {
    id: String,
    title: String,
    description: String,
    suggested_by: String,
    status: String,
    desired_reward: i32,
    duration: String,
    created_at: DateTime<Utc>,
}

impl SuggestionRow {
    fn into_suggestion(self) -> QuestResult<QuestSuggestion> {
        Ok(QuestSuggestion {
            id: SuggestionId::from_db(self.id),
            title: self.title,
            description: self.description,
            suggested_by: SeekerId::from_db(self.suggested_by),
            status: SuggestionStatus::parse(&self.status)
                .ok_or_else(|| corrupt("quest_suggestions.status"))?,
            created_at: self.created_at,
            desired_reward: Stars::positive(self.desired_reward)
                .ok_or_else(|| corrupt("quest_suggestions.desired_reward"))?,
            duration: QuestDuration::parse(&self.duration)
                .ok_or_else(|| corrupt("quest_suggestions.duration"))?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PrizeRow {
    id: String,
    name: String,
    description: String,
    stars_cost: i32,
    image_url: Option<String>,
    available: bool,
}

impl PrizeRow {
    fn into_prize(self) -> QuestResult<Prize> {
        Ok(Prize {
            id: PrizeId::from_db(self.id),
            name: self.name,
            description: self.description,
            stars_cost: Stars::positive(self.stars_cost)
                .ok_or_else(|| corrupt("prizes.stars_cost"))?,
            image_url: self.image_url,
            available: self.available,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: String,
    prize_id: String,
    seeker_id: String,
    redeemed_at: DateTime<Utc>,
    certificate_id: String,
    stars_cost: i32,
    prize_name: Option<String>,
    seeker_name: Option<String>,
}

impl RecordRow {
    fn into_record(self) -> QuestResult<RedemptionRecord> {
        Ok(RedemptionRecord {
            redemption: PrizeRedemption {
                id: RedemptionId::from_db(self.id),
                prize_id: PrizeId::from_db(self.prize_id),
                seeker_id: SeekerId::from_db(self.seeker_id),
                redeemed_at: self.redeemed_at,
                certificate_id: CertificateId::from_db(self.certificate_id),
                stars_cost: Stars::positive(self.stars_cost)
                    .ok_or_else(|| corrupt("prize_redemptions.stars_cost"))?,
            },
            prize_name: self.prize_name,
            seeker_name: self.seeker_name,
        })
    }
}
