//! API error type
//!
//! Every handler returns `ApiResult<T>`; failures are turned into the
//! `{success: false, error}` envelope with a matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cxperia_common::api::types::ApiResponse;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Missing or expired session (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (403)
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found, or owned by another brand (404)
    #[error("{0}")]
    NotFound(String),

    /// Conflict (409), e.g. duplicate email
    #[error("{0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// cxperia-common error, mapped by kind
    #[error(transparent)]
    Common(#[from] cxperia_common::Error),
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{} not found", what))
    }

    pub fn status(&self) -> StatusCode {
        use cxperia_common::Error as CommonError;

        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Common(err) => match err {
                CommonError::NotFound(_) => StatusCode::NOT_FOUND,
                CommonError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                CommonError::Conflict(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details are logged, not returned
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            match self {
                ApiError::Common(cxperia_common::Error::NotFound(msg))
                | ApiError::Common(cxperia_common::Error::InvalidInput(msg))
                | ApiError::Common(cxperia_common::Error::Conflict(msg)) => msg,
                other => other.to_string(),
            }
        };

        (status, Json(ApiResponse::<()>::err(message))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
