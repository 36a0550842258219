//! Prize Catalog Use Case

use std::sync::Arc;

use kernel::id::PrizeId;
use serde::Deserialize;

use crate::application::required_text;
use crate::domain::entities::Prize;
use crate::domain::repository::PrizeRepository;
use crate::domain::value_objects::Stars;
use crate::error::{QuestError, QuestResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrize {
    #[serde(default)]
    pub id: Option<PrizeId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub stars_cost: i32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub stars_cost: Option<i32>,
    pub image_url: Option<String>,
    pub available: Option<bool>,
}

fn cost(value: i32) -> QuestResult<Stars> {
    Stars::positive(value)
        .ok_or_else(|| QuestError::validation("starsCost must be greater than zero"))
}

pub struct PrizeUseCase<R>
where
    R: PrizeRepository,
{
    repo: Arc<R>,
}

impl<R> PrizeUseCase<R>
where
    R: PrizeRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, include_unavailable: bool) -> QuestResult<Vec<Prize>> {
        self.repo.list_prizes(include_unavailable).await
    }

    pub async fn create(&self, input: NewPrize) -> QuestResult<Prize> {
        let prize = Prize {
            id: input.id.unwrap_or_default(),
            name: required_text("name", &input.name)?,
            description: input.description.unwrap_or_default(),
            stars_cost: cost(input.stars_cost)?,
            image_url: input.image_url,
            available: input.available.unwrap_or(true),
        };

        self.repo.create_prize(&prize).await?;
        tracing::info!(prize_id = %prize.id, stars_cost = prize.stars_cost.get(), "Prize created");
        Ok(prize)
    }

    pub async fn update(&self, id: &PrizeId, patch: PrizePatch) -> QuestResult<Prize> {
        let mut prize = self
            .repo
            .find_prize(id)
            .await?
            .ok_or(QuestError::PrizeNotFound)?;

        if let Some(name) = patch.name {
            prize.name = required_text("name", &name)?;
        }
        if let Some(description) = patch.description {
            prize.description = description;
        }
        if let Some(value) = patch.stars_cost {
            prize.stars_cost = cost(value)?;
        }
        if let Some(image_url) = patch.image_url {
            prize.image_url = Some(image_url).filter(|url| !url.is_empty());
        }
        if let Some(available) = patch.available {
            prize.available = available;
        }

        if !self.repo.update_prize(&prize).await? {
            return Err(QuestError::PrizeNotFound);
        }
        tracing::info!(prize_id = %prize.id, available = prize.available, "Prize updated");
        Ok(prize)
    }

    /// Redeemed prizes are kept; deleting an unknown prize is not an error
    pub async fn delete(&self, id: &PrizeId) -> QuestResult<bool> {
        let deleted = self.repo.delete_prize(id).await?;
        if deleted {
            tracing::info!(prize_id = %id, "Prize deleted");
        }
        Ok(deleted)
    }
}
