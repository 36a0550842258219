//! Domain Entities
//!
//! Core business entities for the Quest Mania domain. Entities serialize with
//! camelCase field names, which is the shape the household UI consumes.

use chrono::{DateTime, Utc};
use kernel::id::{CompletionId, PrizeId, QuestId, RedemptionId, SeekerId, SuggestionId};
use serde::Serialize;

use crate::domain::value_objects::{
    Assignees, CertificateId, CompletionStatus, QuestDuration, QuestStatus, SeekerPin, Stars,
    SuggestionStatus,
};
use crate::error::{QuestError, QuestResult};

/// A child collecting stars
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Seeker {
    pub id: SeekerId,
    pub name: String,
    #[serde(skip_serializing)]
    pub pin: SeekerPin,
    pub avatar_url: String,
    pub stars: Stars,
}

/// Field-wise seeker edit; `None` leaves the stored value as it is
#[derive(Debug, Clone, Default)]
pub struct SeekerChanges {
    pub name: Option<String>,
    pub pin: Option<SeekerPin>,
    pub avatar_url: Option<String>,
    pub stars: Option<Stars>,
}

/// A chore with a star reward
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: QuestId,
    pub title: String,
    pub description: String,
    pub reward: Stars,
    pub status: QuestStatus,
    pub duration: QuestDuration,
    pub assigned_to: Assignees,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Seeker who handed the quest in
    pub completed_by: Option<SeekerId>,
    pub created_at: DateTime<Utc>,
}

impl Quest {
    /// Check the `active -> in_progress` edge for `seeker`
    pub fn ensure_startable(&self, seeker: &SeekerId) -> QuestResult<()> {
        if self.status != QuestStatus::Active {
            return Err(QuestError::InvalidTransition {
                from: self.status,
                action: "start",
            });
        }
        if !self.assigned_to.admits(seeker) {
            return Err(QuestError::NotAssigned);
        }
        Ok(())
    }

    /// Check the `in_progress -> pending` edge for `seeker` at `now`
    ///
    /// A seeker handing in a quest that is already pending on their behalf is
    /// a duplicate submission, not an illegal transition.
    pub fn ensure_completable(&self, seeker: &SeekerId, now: DateTime<Utc>) -> QuestResult<()> {
        match self.status {
            QuestStatus::InProgress => {}
            QuestStatus::Pending if self.completed_by.as_ref() == Some(seeker) => {
                return Err(QuestError::DuplicateCompletion);
            }
            from => {
                return Err(QuestError::InvalidTransition {
                    from,
                    action: "complete",
                });
            }
        }
        if !self.assigned_to.admits(seeker) {
            return Err(QuestError::NotAssigned);
        }
        // A quest that somehow lost its start time is treated as just started
        let started_at = self.started_at.unwrap_or(now);
        let ready_at = self.duration.ready_at(started_at);
        if now < ready_at {
            return Err(QuestError::TooEarly { ready_at });
        }
        Ok(())
    }

    /// Pick the seeker an approval pays out to
    ///
    /// A named seeker must be the one who handed the quest in or one of its
    /// assignees.
    pub fn beneficiary(&self, requested: Option<&SeekerId>) -> QuestResult<SeekerId> {
        match requested {
            Some(seeker)
                if self.completed_by.as_ref() == Some(seeker)
                    || self.assigned_to.contains(seeker) =>
            {
                Ok(seeker.clone())
            }
            Some(_) => Err(QuestError::NotAssigned),
            None => self.completed_by.clone().ok_or(QuestError::NoSeekerToCredit),
        }
    }
}

/// A quest idea proposed by a seeker
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestSuggestion {
    pub id: SuggestionId,
    pub title: String,
    pub description: String,
    pub suggested_by: SeekerId,
    pub status: SuggestionStatus,
    pub created_at: DateTime<Utc>,
    pub desired_reward: Stars,
    pub duration: QuestDuration,
}

impl QuestSuggestion {
    /// The quest an approval materializes
    pub fn to_quest(&self, id: QuestId, now: DateTime<Utc>) -> Quest {
        Quest {
            id,
            title: self.title.clone(),
            description: self.description.clone(),
            reward: self.desired_reward,
            status: QuestStatus::Active,
            duration: self.duration,
            assigned_to: Assignees::single(self.suggested_by.clone()),
            started_at: None,
            completed_at: None,
            completed_by: None,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prize {
    pub id: PrizeId,
    pub name: String,
    pub description: String,
    pub stars_cost: Stars,
    pub image_url: Option<String>,
    pub available: bool,
}

/// Immutable record of stars exchanged for a prize
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeRedemption {
    pub id: RedemptionId,
    pub prize_id: PrizeId,
    pub seeker_id: SeekerId,
    pub redeemed_at: DateTime<Utc>,
    pub certificate_id: CertificateId,
    pub stars_cost: Stars,
}

/// A seeker's request to have a quest approved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestCompletion {
    pub id: CompletionId,
    pub quest_id: QuestId,
    pub seeker_id: SeekerId,
    pub status: CompletionStatus,
    pub completed_at: DateTime<Utc>,
}

/// Completed quest with the name of the seeker who earned it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestHistoryEntry {
    #[serde(flatten)]
    pub quest: Quest,
    pub seeker_name: Option<String>,
}

/// Redemption joined with prize and seeker names
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRecord {
    #[serde(flatten)]
    pub redemption: PrizeRedemption,
    pub prize_name: Option<String>,
    pub seeker_name: Option<String>,
}

/// Result of crediting an approved quest
#[derive(Debug, Clone)]
pub struct Approval {
    pub quest: Quest,
    pub seeker_id: SeekerId,
    /// Seeker balance after the credit
    pub stars: Stars,
}

/// Result of a successful redemption
#[derive(Debug, Clone)]
pub struct RedemptionReceipt {
    pub redemption: PrizeRedemption,
    pub remaining_stars: Stars,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn quest(status: QuestStatus, duration: QuestDuration) -> Quest {
        Quest {
            id: QuestId::parse("q1").unwrap(),
            title: "Make the bed".into(),
            description: String::new(),
            reward: Stars::positive(5).unwrap(),
            status,
            duration,
            assigned_to: Assignees::single(SeekerId::parse("s1").unwrap()),
            started_at: None,
            completed_at: None,
            completed_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_start_requires_active_and_assignee() {
        let s1 = SeekerId::parse("s1").unwrap();
        let s2 = SeekerId::parse("s2").unwrap();

        let q = quest(QuestStatus::Active, QuestDuration::None);
        assert!(q.ensure_startable(&s1).is_ok());
        assert!(matches!(q.ensure_startable(&s2), Err(QuestError::NotAssigned)));

        let q = quest(QuestStatus::Pending, QuestDuration::None);
        assert!(matches!(
            q.ensure_startable(&s1),
            Err(QuestError::InvalidTransition { from: QuestStatus::Pending, .. })
        ));
    }

    #[test]
    fn test_daily_quest_gate() {
        let s1 = SeekerId::parse("s1").unwrap();
        let now = Utc::now();

        let mut q = quest(QuestStatus::InProgress, QuestDuration::Daily);
        q.started_at = Some(now);
        assert!(matches!(
            q.ensure_completable(&s1, now + Duration::hours(23)),
            Err(QuestError::TooEarly { .. })
        ));
        assert!(q.ensure_completable(&s1, now + Duration::hours(24)).is_ok());
    }

    #[test]
    fn test_resubmission_is_duplicate() {
        let s1 = SeekerId::parse("s1").unwrap();
        let mut q = quest(QuestStatus::Pending, QuestDuration::None);
        q.completed_by = Some(s1.clone());

        assert!(matches!(
            q.ensure_completable(&s1, Utc::now()),
            Err(QuestError::DuplicateCompletion)
        ));
    }

    #[test]
    fn test_beneficiary_falls_back_to_completer() {
        let s1 = SeekerId::parse("s1").unwrap();
        let s2 = SeekerId::parse("s2").unwrap();
        let mut q = quest(QuestStatus::Pending, QuestDuration::None);

        assert!(matches!(q.beneficiary(None), Err(QuestError::NoSeekerToCredit)));
        q.completed_by = Some(s1.clone());
        assert_eq!(q.beneficiary(None).unwrap(), s1);
        assert_eq!(q.beneficiary(Some(&s1)).unwrap(), s1);
    }

    #[test]
    fn test_named_beneficiary_must_belong_to_quest() {
        let s1 = SeekerId::parse("s1").unwrap();
        let s2 = SeekerId::parse("s2").unwrap();
        let s3 = SeekerId::parse("s3").unwrap();
        let mut q = quest(QuestStatus::Pending, QuestDuration::None);
        q.assigned_to = Assignees::new([s1.clone(), s2.clone()]);
        q.completed_by = Some(s1.clone());

        assert_eq!(q.beneficiary(Some(&s2)).unwrap(), s2);
        assert!(matches!(q.beneficiary(Some(&s3)), Err(QuestError::NotAssigned)));

        // Open quests only pay the seeker who handed them in
        q.assigned_to = Assignees::default();
        assert_eq!(q.beneficiary(Some(&s1)).unwrap(), s1);
        assert!(matches!(q.beneficiary(Some(&s2)), Err(QuestError::NotAssigned)));
    }

    #[test]
    fn test_suggestion_becomes_active_quest() {
        let suggestion = QuestSuggestion {
            id: SuggestionId::parse("sg1").unwrap(),
            title: "Walk the dog".into(),
            description: "Around the block".into(),
            suggested_by: SeekerId::parse("s1").unwrap(),
            status: SuggestionStatus::Pending,
            created_at: Utc::now(),
            desired_reward: Stars::positive(10).unwrap(),
            duration: QuestDuration::Daily,
        };

        let q = suggestion.to_quest(QuestId::parse("q9").unwrap(), Utc::now());
        assert_eq!(q.status, QuestStatus::Active);
        assert_eq!(q.reward.get(), 10);
        assert_eq!(q.duration, QuestDuration::Daily);
        assert!(q.assigned_to.contains(&suggestion.suggested_by));
    }

    #[test]
    fn test_seeker_pin_is_not_serialized() {
        let seeker = Seeker {
            id: SeekerId::parse("s1").unwrap(),
            name: "Ada".into(),
            pin: SeekerPin::parse("1234").unwrap(),
            avatar_url: String::new(),
            stars: Stars::new(3).unwrap(),
        };

        let json = serde_json::to_value(&seeker).unwrap();
        assert!(json.get("pin").is_none());
        assert_eq!(json["avatarUrl"], "");
        assert_eq!(json["stars"], 3);
    }
}
