//! Redeem Prize Use Case

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{PrizeId, SeekerId};
use serde::Deserialize;

use crate::application::config::QuestConfig;
use crate::domain::entities::{RedemptionReceipt, RedemptionRecord};
use crate::domain::repository::RedemptionRepository;
use crate::domain::value_objects::{CertificateId, Stars};
use crate::error::{QuestError, QuestResult};

/// Input DTO for a redemption
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemInput {
    pub prize_id: PrizeId,
    pub seeker_id: SeekerId,
    /// Price the client displayed; checked against the prize, never charged
    #[serde(default)]
    pub stars_cost: Option<i32>,
}

pub struct RedeemPrizeUseCase<R>
where
    R: RedemptionRepository,
{
    repo: Arc<R>,
    config: Arc<QuestConfig>,
}

impl<R> RedeemPrizeUseCase<R>
where
    R: RedemptionRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<QuestConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: RedeemInput) -> QuestResult<RedemptionReceipt> {
        let expected_cost = input
            .stars_cost
            .map(|value| {
                Stars::positive(value)
                    .ok_or_else(|| QuestError::validation("starsCost must be greater than zero"))
            })
            .transpose()?;

        let certificate = CertificateId::generate(&self.config.certificate_prefix);

        let receipt = self
            .repo
            .redeem(
                &input.prize_id,
                &input.seeker_id,
                expected_cost,
                certificate,
                Utc::now(),
            )
            .await?;

        tracing::info!(
            prize_id = %input.prize_id,
            seeker_id = %input.seeker_id,
            certificate_id = %receipt.redemption.certificate_id,
            stars_cost = receipt.redemption.stars_cost.get(),
            remaining_stars = receipt.remaining_stars.get(),
            "Prize redeemed"
        );
        Ok(receipt)
    }

    pub async fn list_all(&self) -> QuestResult<Vec<RedemptionRecord>> {
        self.repo.list_redemptions().await
    }

    pub async fn list_for_seeker(&self, seeker: &SeekerId) -> QuestResult<Vec<RedemptionRecord>> {
        self.repo.list_redemptions_for_seeker(seeker).await
    }
}
