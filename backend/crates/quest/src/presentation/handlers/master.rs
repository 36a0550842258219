//! Master PIN handlers

use axum::extract::State;
use axum::http::StatusCode;

use crate::application::master_auth::MasterAuthUseCase;
use crate::domain::repository::QuestStore;
use crate::error::QuestResult;
use crate::presentation::dto::PinRequest;
use crate::presentation::handlers::QuestAppState;
use crate::presentation::middleware::{ClientKey, JsonBody};

/// POST /api/master/verify
///
/// Lets the UI unlock its master views; the PIN is still sent with every
/// master-only request.
pub async fn verify<R>(
    State(state): State<QuestAppState<R>>,
    ClientKey(client): ClientKey,
    JsonBody(req): JsonBody<PinRequest>,
) -> QuestResult<StatusCode>
where
    R: QuestStore,
{
    MasterAuthUseCase::new(state.limiter.clone(), state.config.clone())
        .verify(Some(req.pin.trim()), &client)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
