//! Seeker handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use kernel::id::SeekerId;

use crate::application::redeem_prize::RedeemPrizeUseCase;
use crate::application::seekers::{NewSeeker, SeekerLoginUseCase, SeekerPatch, SeekerUseCase};
use crate::domain::entities::{Quest, RedemptionRecord, Seeker};
use crate::domain::repository::QuestStore;
use crate::error::QuestResult;
use crate::presentation::dto::{MessageResponse, PinRequest};
use crate::presentation::handlers::QuestAppState;
use crate::presentation::middleware::{ClientKey, JsonBody, RequireMaster};

/// GET /api/seekers
pub async fn list<R>(State(state): State<QuestAppState<R>>) -> QuestResult<Json<Vec<Seeker>>>
where
    R: QuestStore,
{
    let seekers = SeekerUseCase::new(state.repo.clone()).list().await?;
    Ok(Json(seekers))
}

/// GET /api/seekers/{id}
pub async fn get<R>(
    State(state): State<QuestAppState<R>>,
    Path(id): Path<String>,
) -> QuestResult<Json<Seeker>>
where
    R: QuestStore,
{
    let id = SeekerId::parse(id)?;
    let seeker = SeekerUseCase::new(state.repo.clone()).get(&id).await?;
    Ok(Json(seeker))
}

/// POST /api/seekers
pub async fn create<R>(
    _master: RequireMaster,
    State(state): State<QuestAppState<R>>,
    JsonBody(input): JsonBody<NewSeeker>,
) -> QuestResult<(StatusCode, Json<Seeker>)>
where
    R: QuestStore,
{
    let seeker = SeekerUseCase::new(state.repo.clone()).create(input).await?;
    Ok((StatusCode::CREATED, Json(seeker)))
}

/// PUT /api/seekers/{id}
pub async fn update<R>(
    _master: RequireMaster,
    State(state): State<QuestAppState<R>>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<SeekerPatch>,
) -> QuestResult<Json<Seeker>>
where
    R: QuestStore,
{
    let id = SeekerId::parse(id)?;
    let seeker = SeekerUseCase::new(state.repo.clone())
        .update(&id, patch)
        .await?;
    Ok(Json(seeker))
}

/// DELETE /api/seekers/{id}
pub async fn delete<R>(
    _master: RequireMaster,
    State(state): State<QuestAppState<R>>,
    Path(id): Path<String>,
) -> QuestResult<Json<MessageResponse>>
where
    R: QuestStore,
{
    let id = SeekerId::parse(id)?;
    let deleted = SeekerUseCase::new(state.repo.clone()).delete(&id).await?;
    let message = if deleted {
        format!("Seeker {id} deleted successfully")
    } else {
        format!("Seeker {id} did not exist")
    };
    Ok(Json(MessageResponse::new(message)))
}

/// POST /api/seekers/{id}/login
pub async fn login<R>(
    State(state): State<QuestAppState<R>>,
    ClientKey(client): ClientKey,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<PinRequest>,
) -> QuestResult<Json<Seeker>>
where
    R: QuestStore,
{
    let id = SeekerId::parse(id)?;
    let seeker = SeekerLoginUseCase::new(
        state.repo.clone(),
        state.limiter.clone(),
        state.config.clone(),
    )
    .execute(&id, &req.pin, &client)
    .await?;
    Ok(Json(seeker))
}

/// GET /api/seekers/{id}/quests
pub async fn open_quests<R>(
    State(state): State<QuestAppState<R>>,
    Path(id): Path<String>,
) -> QuestResult<Json<Vec<Quest>>>
where
    R: QuestStore,
{
    let id = SeekerId::parse(id)?;
    let quests = SeekerUseCase::new(state.repo.clone())
        .open_quests(&id)
        .await?;
    Ok(Json(quests))
}

/// GET /api/seekers/{id}/redemptions
pub async fn redemptions<R>(
    State(state): State<QuestAppState<R>>,
    Path(id): Path<String>,
) -> QuestResult<Json<Vec<RedemptionRecord>>>
where
    R: QuestStore,
{
    let id = SeekerId::parse(id)?;
    let records = RedeemPrizeUseCase::new(state.repo.clone(), state.config.clone())
        .list_for_seeker(&id)
        .await?;
    Ok(Json(records))
}
