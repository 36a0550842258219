//! API DTOs (Data Transfer Objects)
//!
//! Entities serialize themselves; these are the request bodies and the
//! action-specific responses.

use chrono::{DateTime, Utc};
use kernel::id::{QuestId, RedemptionId, SeekerId};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Approval, Quest, QuestCompletion, QuestSuggestion, RedemptionReceipt};
use crate::domain::value_objects::{Assignees, CertificateId, QuestStatus, Stars};

/// Request for POST /api/master/verify and /api/seekers/{id}/login
#[derive(Debug, Clone, Deserialize)]
pub struct PinRequest {
    pub pin: String,
}

/// Request for POST /api/quests/{id}/start and /complete
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeekerRequest {
    pub seeker_id: SeekerId,
}

/// Request for POST /api/quests/{id}/approve (body optional)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    #[serde(default)]
    pub seeker_id: Option<SeekerId>,
}

/// Request for POST /api/quests/{id}/assign
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    #[serde(default)]
    pub seeker_ids: Assignees,
}

/// Query for GET /api/prizes
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeListQuery {
    #[serde(default)]
    pub include_unavailable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response for POST /api/quests/{id}/start
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub id: QuestId,
    pub status: QuestStatus,
    pub started_at: Option<DateTime<Utc>>,
}

impl From<Quest> for StartResponse {
    fn from(quest: Quest) -> Self {
        Self {
            id: quest.id,
            status: quest.status,
            started_at: quest.started_at,
        }
    }
}

/// Response for POST /api/quests/{id}/complete
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub id: QuestId,
    pub status: QuestStatus,
    pub completed_at: DateTime<Utc>,
    pub completed_by: SeekerId,
    pub completion: QuestCompletion,
}

impl From<(Quest, QuestCompletion)> for CompletionResponse {
    fn from((quest, completion): (Quest, QuestCompletion)) -> Self {
        Self {
            id: quest.id,
            status: quest.status,
            completed_at: completion.completed_at,
            completed_by: completion.seeker_id.clone(),
            completion,
        }
    }
}

/// Response for POST /api/quests/{id}/approve
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveResponse {
    pub id: QuestId,
    pub status: QuestStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub reward: Stars,
    pub seeker_id: SeekerId,
    /// Seeker's balance after the credit
    pub stars: Stars,
}

impl From<Approval> for ApproveResponse {
    fn from(approval: Approval) -> Self {
        Self {
            id: approval.quest.id,
            status: approval.quest.status,
            completed_at: approval.quest.completed_at,
            reward: approval.quest.reward,
            seeker_id: approval.seeker_id,
            stars: approval.stars,
        }
    }
}

/// Response for POST /api/quests/{id}/reject
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectResponse {
    pub id: QuestId,
    pub status: QuestStatus,
    pub message: &'static str,
}

impl From<Quest> for RejectResponse {
    fn from(quest: Quest) -> Self {
        Self {
            id: quest.id,
            status: quest.status,
            message: "Quest completion rejected",
        }
    }
}

/// Response for POST /api/quest-suggestions/{id}/approve
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionApprovalResponse {
    pub suggestion: QuestSuggestion,
    pub quest: Quest,
}

/// Response for POST /api/quest-suggestions/{id}/reject
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionRejectResponse {
    pub suggestion: QuestSuggestion,
}

/// Response for POST /api/prizes/redeem
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResponse {
    pub certificate_id: CertificateId,
    pub redemption_id: RedemptionId,
    pub stars_cost: Stars,
    pub remaining_stars: Stars,
    pub redeemed_at: DateTime<Utc>,
}

impl From<RedemptionReceipt> for RedeemResponse {
    fn from(receipt: RedemptionReceipt) -> Self {
        Self {
            certificate_id: receipt.redemption.certificate_id,
            redemption_id: receipt.redemption.id,
            stars_cost: receipt.redemption.stars_cost,
            remaining_stars: receipt.remaining_stars,
            redeemed_at: receipt.redemption.redeemed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::CompletionStatus;
    use kernel::id::CompletionId;
    use serde_json::json;

    #[test]
    fn test_approve_request_accepts_empty_object() {
        let request: ApproveRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.seeker_id.is_none());

        let request: ApproveRequest =
            serde_json::from_value(json!({ "seekerId": "S1" })).unwrap();
        assert_eq!(request.seeker_id.unwrap().as_str(), "S1");
    }

    #[test]
    fn test_assign_request_accepts_single_id() {
        let request: AssignRequest =
            serde_json::from_value(json!({ "seekerIds": "S1" })).unwrap();
        assert_eq!(request.seeker_ids.len(), 1);

        let request: AssignRequest =
            serde_json::from_value(json!({ "seekerIds": ["S1", "S2", "S1"] })).unwrap();
        assert_eq!(request.seeker_ids.len(), 2);
    }

    #[test]
    fn test_prize_query_defaults_to_available_only() {
        let query: PrizeListQuery = serde_json::from_value(json!({})).unwrap();
        assert!(!query.include_unavailable);
    }

    #[test]
    fn test_completion_response_shape() {
        let now = Utc::now();
        let quest = Quest {
            id: QuestId::from_db("Q1".into()),
            title: "Dishes".into(),
            description: String::new(),
            reward: Stars::positive(2).unwrap(),
            status: QuestStatus::Pending,
            duration: Default::default(),
            assigned_to: Assignees::default(),
            started_at: Some(now),
            completed_at: Some(now),
            completed_by: Some(SeekerId::from_db("S1".into())),
            created_at: now,
        };
        let completion = QuestCompletion {
            id: CompletionId::from_db("C1".into()),
            quest_id: quest.id.clone(),
            seeker_id: SeekerId::from_db("S1".into()),
            status: CompletionStatus::Pending,
            completed_at: now,
        };

        let value = serde_json::to_value(CompletionResponse::from((quest, completion))).unwrap();
        assert_eq!(value["id"], "Q1");
        assert_eq!(value["status"], "pending");
        assert_eq!(value["completedBy"], "S1");
        assert!(value["completedAt"].is_string());
    }
}
