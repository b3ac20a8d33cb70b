use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    credentials::CredentialError, repository::RepositoryError, schema::ErrorResponse,
    token::TokenError,
};

/// Errors surfaced by the HTTP layer. Every variant renders as `{ "error": message }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Access denied")]
    Unauthorized,
    #[error("Invalid token")]
    Forbidden,
    #[error("{0}")]
    Conflict(String),
    // "does not exist" and "belongs to someone else" share one answer
    #[error("Todo not found or unauthorized")]
    NotFoundOrUnauthorized,
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFoundOrUnauthorized => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(detail) = &self {
            tracing::error!(%detail, "request failed");
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidInput(msg) => AppError::InvalidInput(msg.to_string()),
            CredentialError::DuplicateUsername => {
                AppError::Conflict("Username already exists".to_string())
            }
            CredentialError::InvalidCredentials => AppError::InvalidCredentials,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Missing => AppError::Unauthorized,
            TokenError::Malformed | TokenError::Expired => AppError::Forbidden,
            TokenError::Signing(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::InvalidInput(msg) => AppError::InvalidInput(msg.to_string()),
            RepositoryError::NotFoundOrUnauthorized => AppError::NotFoundOrUnauthorized,
            RepositoryError::Storage(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

// A non-numeric id can never name a todo
impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::NotFoundOrUnauthorized
    }
}
