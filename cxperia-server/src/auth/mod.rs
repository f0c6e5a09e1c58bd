//! Session authentication and role extractors
//!
//! Handlers take one of `CurrentUser`, `Operator` or `SuperAdmin` as an
//! argument; the extractor rejects the request before the handler runs.

pub mod cookies;
pub mod password;
pub mod session;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;
use cxperia_common::db::{Profile, Role};
use tracing::debug;

use crate::db;
use crate::error::ApiError;
use crate::AppState;

/// Authenticated profile behind a valid, unexpired session
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub profile: Profile,
    /// Digest of the presented token, used to revoke this session
    pub token_hash: String,
}

impl CurrentUser {
    pub fn brand_id(&self) -> &str {
        &self.profile.brand_id
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = cookies::token_from_headers(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;
        let token_hash = session::hash_token(&token);

        let (profile_id, expires_at) = db::sessions::find_session(&state.db, &token_hash)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid session".to_string()))?;

        if expires_at <= Utc::now() {
            debug!("Rejecting expired session for profile {}", profile_id);
            db::sessions::delete_session(&state.db, &token_hash).await?;
            return Err(ApiError::Unauthorized("Session expired".to_string()));
        }

        let profile = db::profiles::get_profile(&state.db, &profile_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid session".to_string()))?;

        Ok(CurrentUser {
            profile,
            token_hash,
        })
    }
}

/// Platform operator (`super_admin` or `sales_admin`)
#[derive(Debug, Clone)]
pub struct Operator(pub CurrentUser);

#[axum::async_trait]
impl FromRequestParts<AppState> for Operator {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.profile.role.is_operator() {
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }
        Ok(Operator(user))
    }
}

/// `super_admin` only
#[derive(Debug, Clone)]
pub struct SuperAdmin(pub CurrentUser);

#[axum::async_trait]
impl FromRequestParts<AppState> for SuperAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if user.profile.role != Role::SuperAdmin {
            return Err(ApiError::Forbidden("Super admin access required".to_string()));
        }
        Ok(SuperAdmin(user))
    }
}
