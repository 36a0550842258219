//! Quest suggestion handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use kernel::id::SuggestionId;

use crate::application::suggestions::{NewSuggestion, SuggestionPatch, SuggestionUseCase};
use crate::domain::entities::QuestSuggestion;
use crate::domain::repository::QuestStore;
use crate::error::QuestResult;
use crate::presentation::dto::{SuggestionApprovalResponse, SuggestionRejectResponse};
use crate::presentation::handlers::QuestAppState;
use crate::presentation::middleware::{JsonBody, RequireMaster};

/// GET /api/quest-suggestions
pub async fn list<R>(
    State(state): State<QuestAppState<R>>,
) -> QuestResult<Json<Vec<QuestSuggestion>>>
where
    R: QuestStore,
{
    let suggestions = SuggestionUseCase::new(state.repo.clone()).list().await?;
    Ok(Json(suggestions))
}

/// POST /api/quest-suggestions
pub async fn create<R>(
    State(state): State<QuestAppState<R>>,
    JsonBody(input): JsonBody<NewSuggestion>,
) -> QuestResult<(StatusCode, Json<QuestSuggestion>)>
where
    R: QuestStore,
{
    let suggestion = SuggestionUseCase::new(state.repo.clone())
        .create(input)
        .await?;
    Ok((StatusCode::CREATED, Json(suggestion)))
}

/// PUT /api/quest-suggestions/{id}
pub async fn update<R>(
    _master: RequireMaster,
    State(state): State<QuestAppState<R>>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<SuggestionPatch>,
) -> QuestResult<Json<QuestSuggestion>>
where
    R: QuestStore,
{
    let id = SuggestionId::parse(id)?;
    let suggestion = SuggestionUseCase::new(state.repo.clone())
        .update(&id, patch)
        .await?;
    Ok(Json(suggestion))
}

/// POST /api/quest-suggestions/{id}/approve
pub async fn approve<R>(
    _master: RequireMaster,
    State(state): State<QuestAppState<R>>,
    Path(id): Path<String>,
) -> QuestResult<Json<SuggestionApprovalResponse>>
where
    R: QuestStore,
{
    let id = SuggestionId::parse(id)?;
    let (suggestion, quest) = SuggestionUseCase::new(state.repo.clone())
        .approve(&id)
        .await?;
    Ok(Json(SuggestionApprovalResponse { suggestion, quest }))
}

/// POST /api/quest-suggestions/{id}/reject
pub async fn reject<R>(
    _master: RequireMaster,
    State(state): State<QuestAppState<R>>,
    Path(id): Path<String>,
) -> QuestResult<Json<SuggestionRejectResponse>>
where
    R: QuestStore,
{
    let id = SuggestionId::parse(id)?;
    let suggestion = SuggestionUseCase::new(state.repo.clone())
        .reject(&id)
        .await?;
    Ok(Json(SuggestionRejectResponse { suggestion }))
}
