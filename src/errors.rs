use crate::models::GoalId;
use axum::http::StatusCode;
use thiserror::Error;

/// Failures raised by goal operations.
#[derive(Debug, Error)]
pub enum GoalError {
    /// User input was rejected; the message is shown as a blocking notice.
    #[error("{0}")]
    Validation(String),

    /// A threshold-flow answer arrived for a goal with no open flow.
    #[error("no pending completion prompt for goal {0}")]
    NoPendingFlow(GoalId),

    #[error("invalid transition from {from} to {to} for goal {goal_id}")]
    InvalidTransition {
        goal_id: GoalId,
        from: String,
        to: String,
    },

    #[error("stored goals are malformed: {0}")]
    MalformedState(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<GoalError> for AppError {
    fn from(err: GoalError) -> Self {
        match err {
            GoalError::Validation(message) => Self::bad_request(message),
            GoalError::NoPendingFlow(_) | GoalError::InvalidTransition { .. } => {
                Self::conflict(err.to_string())
            }
            other => Self::internal(other),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
