//! The caller's own brand

use axum::{extract::State, response::IntoResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::cache::{purge_brand, purge_slugs};
use super::{ok, validate, JsonBody};
use crate::auth::CurrentUser;
use crate::db;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBrandRequest {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedBrand {
    pub brand_id: String,
    pub rows_removed: u64,
}

/// GET /api/brand
pub async fn get_brand(State(state): State<AppState>, user: CurrentUser) -> ApiResult<impl IntoResponse> {
    let brand = db::found(db::brands::get_brand(&state.db, user.brand_id()).await?, "Brand")?;
    Ok(ok(brand))
}

/// PATCH /api/brand
pub async fn update_brand(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(req): JsonBody<UpdateBrandRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut brand = db::found(db::brands::get_brand(&state.db, user.brand_id()).await?, "Brand")?;

    if let Some(name) = req.name {
        brand.name = validate::required("Brand name", &name)?;
    }
    if let Some(url) = req.logo_url {
        brand.logo_url = validate::optional(Some(url))
            .map(|u| validate::http_url("Logo URL", &u))
            .transpose()?;
    }
    if req.primary_color.is_some() {
        brand.primary_color = validate::color(req.primary_color)?;
    }
    if req.contact_email.is_some() {
        brand.contact_email = validate::optional_email(req.contact_email)?;
    }
    validate::patch(&mut brand.contact_phone, req.contact_phone);
    validate::patch(&mut brand.website, req.website);
    brand.updated_at = Utc::now();

    db::brands::update_brand(&state.db, &brand).await?;
    purge_brand(&state, user.brand_id()).await?;
    Ok(ok(brand))
}

/// DELETE /api/brand
///
/// Deletes the account and everything the brand owns, atomically.
pub async fn delete_brand(State(state): State<AppState>, user: CurrentUser) -> ApiResult<impl IntoResponse> {
    let brand_id = user.brand_id().to_string();
    let slugs = db::experiences::slugs_for_brand(&state.db, &brand_id).await?;

    let rows_removed = db::brands::delete_brand(&state.db, &brand_id).await?;
    purge_slugs(&state, &slugs).await;

    info!("Brand {} deleted by {} ({} rows)", brand_id, user.profile.email, rows_removed);
    Ok(ok(DeletedBrand {
        brand_id,
        rows_removed,
    }))
}
