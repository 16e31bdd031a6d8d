use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use super::repo::UniqueViolation;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User with id {0} not found")]
    NotFound(i32),

    #[error("User not found")]
    NoMatch,

    #[error("Invalid user id: {0}")]
    InvalidId(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Persistence-layer failure, passed through untouched.
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            UserError::NotFound(_) | UserError::NoMatch => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            UserError::InvalidId(_) | UserError::Validation(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            UserError::Persistence(e) if e.downcast_ref::<UniqueViolation>().is_some() => {
                warn!(error = %e, "write rejected by unique constraint");
                (StatusCode::CONFLICT, "User already exists".to_string())
            }
            UserError::Hashing(_) | UserError::Persistence(_) => {
                error!(error = %self, "user operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}
