//! Maps domain failures to HTTP responses.
//!
//! Every error body is `{"error": "<message>"}`. Store failures are logged
//! in full and reported to the client as an opaque 500.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use factguard_db::DbError;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::token::TokenError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    DuplicateContent(String),

    #[error("User already exists")]
    DuplicateEmail,

    /// Used both for "does not exist" and "belongs to someone else".
    #[error("{0}")]
    NotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("No token provided")]
    MissingToken,

    #[error("Admin access required")]
    Forbidden,

    #[error("Could not allocate an identifier, please retry")]
    AllocationFailure,

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::DuplicateContent(_) | Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MissingToken | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::AllocationFailure => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Invalid(message) => Self::Validation(message),
            DbError::Duplicate(label) => {
                Self::DuplicateContent(format!("Duplicate {}. Already exists.", label.to_lowercase()))
            }
            DbError::DuplicateEmail => Self::DuplicateEmail,
            DbError::NotFound(label) => Self::NotFound(format!("{label} not found")),
            DbError::IdentifierExhausted { .. } => {
                warn!("{}", err);
                Self::AllocationFailure
            }
            DbError::Encoding(_) | DbError::Sqlite(_) | DbError::Poisoned(_) => {
                error!("Store error: {}", err);
                Self::Internal
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encode(e) => {
                error!("Failed to sign token: {}", e);
                Self::Internal
            }
            // Callers never learn which check failed.
            other => {
                debug!("Rejected token: {}", other);
                Self::Unauthorized
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}
