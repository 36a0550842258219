//! Prize catalog and redemption handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use kernel::id::PrizeId;

use crate::application::prizes::{NewPrize, PrizePatch, PrizeUseCase};
use crate::application::redeem_prize::{RedeemInput, RedeemPrizeUseCase};
use crate::domain::entities::{Prize, RedemptionRecord};
use crate::domain::repository::QuestStore;
use crate::error::QuestResult;
use crate::presentation::dto::{MessageResponse, PrizeListQuery, RedeemResponse};
use crate::presentation::handlers::QuestAppState;
use crate::presentation::middleware::{JsonBody, RequireMaster};

/// GET /api/prizes?includeUnavailable=true
pub async fn list<R>(
    State(state): State<QuestAppState<R>>,
    Query(query): Query<PrizeListQuery>,
) -> QuestResult<Json<Vec<Prize>>>
where
    R: QuestStore,
{
    let prizes = PrizeUseCase::new(state.repo.clone())
        .list(query.include_unavailable)
        .await?;
    Ok(Json(prizes))
}

/// POST /api/prizes
pub async fn create<R>(
    _master: RequireMaster,
    State(state): State<QuestAppState<R>>,
    JsonBody(input): JsonBody<NewPrize>,
) -> QuestResult<(StatusCode, Json<Prize>)>
where
    R: QuestStore,
{
    let prize = PrizeUseCase::new(state.repo.clone()).create(input).await?;
    Ok((StatusCode::CREATED, Json(prize)))
}

/// PUT /api/prizes/{id}
pub async fn update<R>(
    _master: RequireMaster,
    State(state): State<QuestAppState<R>>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<PrizePatch>,
) -> QuestResult<Json<Prize>>
where
    R: QuestStore,
{
    let id = PrizeId::parse(id)?;
    let prize = PrizeUseCase::new(state.repo.clone())
        .update(&id, patch)
        .await?;
    Ok(Json(prize))
}

/// DELETE /api/prizes/{id}
pub async fn delete<R>(
    _master: RequireMaster,
    State(state): State<QuestAppState<R>>,
    Path(id): Path<String>,
) -> QuestResult<Json<MessageResponse>>
where
    R: QuestStore,
{
    let id = PrizeId::parse(id)?;
    let deleted = PrizeUseCase::new(state.repo.clone()).delete(&id).await?;
    let message = if deleted {
        "Prize deleted successfully"
    } else {
        "Prize did not exist"
    };
    Ok(Json(MessageResponse::new(message)))
}

/// POST /api/prizes/redeem
pub async fn redeem<R>(
    State(state): State<QuestAppState<R>>,
    JsonBody(input): JsonBody<RedeemInput>,
) -> QuestResult<Json<RedeemResponse>>
where
    R: QuestStore,
{
    let receipt = RedeemPrizeUseCase::new(state.repo.clone(), state.config.clone())
        .execute(input)
        .await?;
    Ok(Json(receipt.into()))
}

/// GET /api/prize-redemptions
pub async fn redemptions<R>(
    _master: RequireMaster,
    State(state): State<QuestAppState<R>>,
) -> QuestResult<Json<Vec<RedemptionRecord>>>
where
    R: QuestStore,
{
    let records = RedeemPrizeUseCase::new(state.repo.clone(), state.config.clone())
        .list_all()
        .await?;
    Ok(Json(records))
}
