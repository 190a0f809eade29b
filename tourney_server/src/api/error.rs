//! Mapping of engine errors onto HTTP responses.

use crate::{logging, metrics};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tourney::{CoreError, ErrorKind};

/// JSON body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

/// Errors a handler can return
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Missing or malformed bearer token")]
    MissingToken,

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Result type for handlers
pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// HTTP status for an error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidState | ErrorKind::ConflictViolation => StatusCode::CONFLICT,
        ErrorKind::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
        ErrorKind::Timeout => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            // A bad token is an authentication failure, not a refusal
            ApiError::Core(CoreError::InvalidToken(_)) | ApiError::MissingToken => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Core(err) => status_for(err.kind()),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn kind_label(&self) -> String {
        match self {
            ApiError::Core(err) => err.kind().to_string(),
            ApiError::MissingToken => ErrorKind::Unauthorized.to_string(),
            ApiError::BadRequest(_) => "bad_request".to_string(),
        }
    }

    fn client_message(&self) -> String {
        match self {
            ApiError::Core(err) => err.client_message(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind_label();

        match &self {
            ApiError::Core(err) if err.kind() == ErrorKind::Internal => {
                tracing::error!(error = %err, "Internal error");
            }
            ApiError::Core(CoreError::Unauthorized(message)) => {
                logging::log_security_event("forbidden", None, message);
            }
            ApiError::Core(CoreError::InvalidToken(_)) | ApiError::MissingToken => {
                logging::log_security_event("unauthenticated", None, &self.to_string());
            }
            other => tracing::debug!(error = %other, "Request failed"),
        }
        metrics::errors_total(&kind);

        let body = ErrorResponse {
            error: self.client_message(),
            kind,
        };
        (status, Json(body)).into_response()
    }
}
