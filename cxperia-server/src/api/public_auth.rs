//! Shared-secret middleware for the public viewer routes
//!
//! The viewer sends the secret in the `x-api-secret` header. A stored secret
//! of 0 disables the check.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use cxperia_common::api::auth::{validate_secret, ApiAuthError, SECRET_HEADER};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

/// Reject public requests without a matching `x-api-secret` (403)
pub async fn public_secret_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok());

    validate_secret(provided, state.shared_secret).map_err(|e| {
        if e == ApiAuthError::InvalidSecret {
            warn!("Public request to {} with wrong API secret", request.uri().path());
        }
        ApiError::Forbidden(e.to_string())
    })?;

    Ok(next.run(request).await)
}
