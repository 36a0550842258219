//! Quest Mania Error Types
//!
//! Domain-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::id::IdError;
use thiserror::Error;

use crate::domain::value_objects::QuestStatus;

pub type QuestResult<T> = Result<T, QuestError>;

#[derive(Debug, Error)]
pub enum QuestError {
    #[error("Seeker not found")]
    SeekerNotFound,

    #[error("Quest not found")]
    QuestNotFound,

    #[error("Quest suggestion not found")]
    SuggestionNotFound,

    #[error("Prize not found")]
    PrizeNotFound,

    #[error("{0} already exists")]
    AlreadyExists(&'static str),

    #[error("Quest is {from}, cannot {action} it")]
    InvalidTransition {
        from: QuestStatus,
        action: &'static str,
    },

    #[error("Seeker is not assigned to this quest")]
    NotAssigned,

    #[error("Quest cannot be completed before {ready_at}")]
    TooEarly { ready_at: DateTime<Utc> },

    #[error("Quest completion already submitted")]
    DuplicateCompletion,

    #[error("Completed quests cannot be changed or deleted")]
    QuestCompleted,

    #[error("No seeker to credit for this quest")]
    NoSeekerToCredit,

    #[error("Quest suggestion has already been reviewed")]
    SuggestionReviewed,

    #[error("Prize is not available")]
    PrizeUnavailable,

    #[error("Cannot delete prize with existing redemptions")]
    PrizeHasRedemptions,

    #[error("Insufficient stars")]
    InsufficientStars,

    #[error("Prize costs {actual} stars, not {expected}")]
    StarsCostMismatch { expected: i32, actual: i32 },

    #[error("{0}")]
    Validation(String),

    #[error("Master PIN required")]
    MasterPinRequired,

    #[error("Invalid master PIN")]
    InvalidMasterPin,

    #[error("Invalid PIN")]
    InvalidSeekerPin,

    #[error("Too many PIN attempts, try again later")]
    TooManyAttempts,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuestError {
    pub fn validation(message: impl Into<String>) -> Self {
        QuestError::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            QuestError::SeekerNotFound
            | QuestError::QuestNotFound
            | QuestError::SuggestionNotFound
            | QuestError::PrizeNotFound => ErrorKind::NotFound,
            QuestError::AlreadyExists(_) => ErrorKind::Conflict,
            QuestError::InvalidTransition { .. }
            | QuestError::NotAssigned
            | QuestError::TooEarly { .. }
            | QuestError::DuplicateCompletion
            | QuestError::QuestCompleted
            | QuestError::NoSeekerToCredit
            | QuestError::SuggestionReviewed
            | QuestError::PrizeUnavailable
            | QuestError::PrizeHasRedemptions
            | QuestError::InsufficientStars
            | QuestError::StarsCostMismatch { .. }
            | QuestError::Validation(_) => ErrorKind::BadRequest,
            QuestError::MasterPinRequired
            | QuestError::InvalidMasterPin
            | QuestError::InvalidSeekerPin => ErrorKind::Unauthorized,
            QuestError::TooManyAttempts => ErrorKind::TooManyRequests,
            QuestError::Database(_) | QuestError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Status code of the rendered response
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            // Constraint violations and pool exhaustion get their own codes
            QuestError::Database(e) => kernel_status_for(e),
            other => other.kind().status_code(),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn log(&self) {
        match self {
            QuestError::Database(e) => {
                tracing::error!(error = %e, "Quest database error");
            }
            QuestError::Internal(msg) => {
                tracing::error!(message = %msg, "Quest internal error");
            }
            QuestError::InvalidMasterPin | QuestError::InvalidSeekerPin => {
                tracing::warn!(error = %self, "PIN rejected");
            }
            QuestError::TooManyAttempts => {
                tracing::warn!("PIN attempts rate limited");
            }
            _ => {
                tracing::debug!(error = %self, "Quest request rejected");
            }
        }
    }
}

fn kernel_status_for(err: &sqlx::Error) -> u16 {
    match err {
        sqlx::Error::RowNotFound => 404,
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => 503,
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some("23505") => 409,
            Some("23502" | "23514") => 400,
            _ => 500,
        },
        _ => 500,
    }
}

impl From<QuestError> for AppError {
    fn from(err: QuestError) -> Self {
        match err {
            // Driver messages stay in the logs
            QuestError::Database(e) => AppError::from(e),
            QuestError::Internal(_) => AppError::internal("Internal server error"),
            QuestError::TooEarly { .. } => {
                let message = err.to_string();
                AppError::bad_request(message).with_action("Keep going and try again later")
            }
            QuestError::InsufficientStars => AppError::bad_request("Insufficient stars")
                .with_action("Complete more quests to earn stars"),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}

impl IntoResponse for QuestError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}

impl From<JsonRejection> for QuestError {
    fn from(rejection: JsonRejection) -> Self {
        QuestError::Validation(rejection.body_text())
    }
}

impl From<IdError> for QuestError {
    fn from(err: IdError) -> Self {
        QuestError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_into_response_status_codes() {
        let cases: Vec<(QuestError, StatusCode)> = vec![
            (QuestError::QuestNotFound, StatusCode::NOT_FOUND),
            (QuestError::SeekerNotFound, StatusCode::NOT_FOUND),
            (QuestError::AlreadyExists("Seeker"), StatusCode::CONFLICT),
            (QuestError::InsufficientStars, StatusCode::BAD_REQUEST),
            (QuestError::DuplicateCompletion, StatusCode::BAD_REQUEST),
            (QuestError::PrizeHasRedemptions, StatusCode::BAD_REQUEST),
            (
                QuestError::InvalidTransition {
                    from: QuestStatus::Completed,
                    action: "reject",
                },
                StatusCode::BAD_REQUEST,
            ),
            (QuestError::InvalidMasterPin, StatusCode::UNAUTHORIZED),
            (QuestError::MasterPinRequired, StatusCode::UNAUTHORIZED),
            (QuestError::TooManyAttempts, StatusCode::TOO_MANY_REQUESTS),
            (
                QuestError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                QuestError::Database(sqlx::Error::PoolTimedOut),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected, "{error:?}");
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_messages_match_household_ui() {
        assert_eq!(
            QuestError::DuplicateCompletion.to_string(),
            "Quest completion already submitted"
        );
        assert_eq!(
            QuestError::PrizeHasRedemptions.to_string(),
            "Cannot delete prize with existing redemptions"
        );
        assert_eq!(
            QuestError::InvalidTransition {
                from: QuestStatus::Pending,
                action: "start",
            }
            .to_string(),
            "Quest is pending, cannot start it"
        );
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let app: AppError = QuestError::Internal("secret detail".into()).into();
        assert_eq!(app.message(), "Internal server error");
    }
}
