//! Public cache invalidation

use axum::{extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ok, JsonBody};
use crate::auth::CurrentUser;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PurgeRequest {
    pub slug: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PurgeResult {
    pub purged: Vec<String>,
}

/// Invalidate the cached public routes of `slugs`, returning the keys dropped
pub(crate) async fn purge_slugs(state: &AppState, slugs: &[String]) -> Vec<String> {
    let mut purged = Vec::new();
    for slug in slugs {
        purged.extend(state.cache.purge_slug(slug).await);
    }
    purged
}

/// Invalidate the cached public routes of every slug a brand has issued
///
/// Anything shown on a brand's public pages (branding, product list,
/// tutorials) calls this after a write.
pub(crate) async fn purge_brand(state: &AppState, brand_id: &str) -> ApiResult<Vec<String>> {
    let slugs = db::experiences::slugs_for_brand(&state.db, brand_id).await?;
    Ok(purge_slugs(state, &slugs).await)
}

/// POST /api/cache/purge `{slug?}`
///
/// Without a slug, every slug of the caller's brand is purged. A slug that
/// belongs to another brand is rejected as not found.
pub async fn purge_cache(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(req): JsonBody<PurgeRequest>,
) -> ApiResult<impl IntoResponse> {
    let purged = match req.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => {
            let owned = db::experiences::slugs_for_brand(&state.db, user.brand_id()).await?;
            if !owned.iter().any(|s| s == slug) {
                return Err(ApiError::not_found("Experience"));
            }
            state.cache.purge_slug(slug).await
        }
        None => purge_brand(&state, user.brand_id()).await?,
    };

    info!("Purged {} public cache keys for brand {}", purged.len(), user.brand_id());
    Ok(ok(PurgeResult { purged }))
}
