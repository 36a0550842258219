//! Quest handlers: master CRUD and the seeker/master lifecycle actions

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use kernel::id::QuestId;

use crate::application::quest_lifecycle::QuestLifecycleUseCase;
use crate::application::quests::{NewQuest, QuestPatch, QuestUseCase};
use crate::domain::entities::{Quest, QuestHistoryEntry};
use crate::domain::repository::QuestStore;
use crate::error::QuestResult;
use crate::presentation::dto::{
    ApproveRequest, ApproveResponse, AssignRequest, CompletionResponse, MessageResponse,
    RejectResponse, SeekerRequest, StartResponse,
};
use crate::presentation::handlers::{QuestAppState, optional_json};
use crate::presentation::middleware::{JsonBody, RequireMaster};

/// GET /api/quests
pub async fn list<R>(State(state): State<QuestAppState<R>>) -> QuestResult<Json<Vec<Quest>>>
where
    R: QuestStore,
{
    let quests = QuestUseCase::new(state.repo.clone()).list().await?;
    Ok(Json(quests))
}

/// GET /api/quests/history
pub async fn history<R>(
    State(state): State<QuestAppState<R>>,
) -> QuestResult<Json<Vec<QuestHistoryEntry>>>
where
    R: QuestStore,
{
    let entries = QuestUseCase::new(state.repo.clone()).history().await?;
    Ok(Json(entries))
}

/// GET /api/quests/{id}
pub async fn get<R>(
    State(state): State<QuestAppState<R>>,
    Path(id): Path<String>,
) -> QuestResult<Json<Quest>>
where
    R: QuestStore,
{
    let id = QuestId::parse(id)?;
    let quest = QuestUseCase::new(state.repo.clone()).get(&id).await?;
    Ok(Json(quest))
}

/// POST /api/quests
pub async fn create<R>(
    _master: RequireMaster,
    State(state): State<QuestAppState<R>>,
    JsonBody(input): JsonBody<NewQuest>,
) -> QuestResult<(StatusCode, Json<Quest>)>
where
    R: QuestStore,
{
    let quest = QuestUseCase::new(state.repo.clone()).create(input).await?;
    Ok((StatusCode::CREATED, Json(quest)))
}

/// PUT /api/quests/{id}
pub async fn update<R>(
    _master: RequireMaster,
    State(state): State<QuestAppState<R>>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<QuestPatch>,
) -> QuestResult<Json<Quest>>
where
    R: QuestStore,
{
    let id = QuestId::parse(id)?;
    let quest = QuestUseCase::new(state.repo.clone())
        .update(&id, patch)
        .await?;
    Ok(Json(quest))
}

/// DELETE /api/quests/{id}
pub async fn delete<R>(
    _master: RequireMaster,
    State(state): State<QuestAppState<R>>,
    Path(id): Path<String>,
) -> QuestResult<Json<MessageResponse>>
where
    R: QuestStore,
{
    let id = QuestId::parse(id)?;
    let deleted = QuestUseCase::new(state.repo.clone()).delete(&id).await?;
    let message = if deleted {
        format!("Quest {id} deleted successfully")
    } else {
        format!("Quest {id} did not exist")
    };
    Ok(Json(MessageResponse::new(message)))
}

/// POST /api/quests/{id}/assign
pub async fn assign<R>(
    _master: RequireMaster,
    State(state): State<QuestAppState<R>>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<AssignRequest>,
) -> QuestResult<Json<Quest>>
where
    R: QuestStore,
{
    let id = QuestId::parse(id)?;
    let quest = QuestUseCase::new(state.repo.clone())
        .assign(&id, req.seeker_ids)
        .await?;
    Ok(Json(quest))
}

/// POST /api/quests/{id}/start
pub async fn start<R>(
    State(state): State<QuestAppState<R>>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<SeekerRequest>,
) -> QuestResult<Json<StartResponse>>
where
    R: QuestStore,
{
    let id = QuestId::parse(id)?;
    let quest = QuestLifecycleUseCase::new(state.repo.clone())
        .start(&id, &req.seeker_id)
        .await?;
    Ok(Json(quest.into()))
}

/// POST /api/quests/{id}/complete and /api/quests/{id}/complete-request
pub async fn complete<R>(
    State(state): State<QuestAppState<R>>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<SeekerRequest>,
) -> QuestResult<Json<CompletionResponse>>
where
    R: QuestStore,
{
    let id = QuestId::parse(id)?;
    let submitted = QuestLifecycleUseCase::new(state.repo.clone())
        .complete(&id, &req.seeker_id)
        .await?;
    Ok(Json(submitted.into()))
}

/// POST /api/quests/{id}/approve
pub async fn approve<R>(
    _master: RequireMaster,
    State(state): State<QuestAppState<R>>,
    Path(id): Path<String>,
    body: Bytes,
) -> QuestResult<Json<ApproveResponse>>
where
    R: QuestStore,
{
    let id = QuestId::parse(id)?;
    let req: ApproveRequest = optional_json(&body)?;
    let approval = QuestLifecycleUseCase::new(state.repo.clone())
        .approve(&id, req.seeker_id.as_ref())
        .await?;
    Ok(Json(approval.into()))
}

/// POST /api/quests/{id}/reject
pub async fn reject<R>(
    _master: RequireMaster,
    State(state): State<QuestAppState<R>>,
    Path(id): Path<String>,
) -> QuestResult<Json<RejectResponse>>
where
    R: QuestStore,
{
    let id = QuestId::parse(id)?;
    let quest = QuestLifecycleUseCase::new(state.repo.clone())
        .reject(&id)
        .await?;
    Ok(Json(quest.into()))
}
