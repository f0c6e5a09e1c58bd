//! Operator (admin panel) endpoints
//!
//! `super_admin` and `sales_admin` may read and change plans; only
//! `super_admin` may delete a brand.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use cxperia_common::db::{Brand, Plan, Profile};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::cache::purge_slugs;
use super::{ok, JsonBody, QueryParams};
use crate::auth::{Operator, SuperAdmin};
use crate::db;
use crate::db::brands::BrandCounts;
use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, PageQuery, PAGE_SIZE};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct BrandDetail {
    #[serde(flatten)]
    pub brand: Brand,
    pub counts: BrandCounts,
    pub users: Vec<Profile>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlanRequest {
    pub plan: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminPageQuery {
    pub page: Option<i64>,
}

/// GET /api/admin/brands?page=&search=
pub async fn list_brands(
    State(state): State<AppState>,
    _operator: Operator,
    QueryParams(query): QueryParams<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let total = db::brands::count_brands(&state.db, query.search()).await?;
    let pagination = calculate_pagination(total, query.page());
    let items = db::brands::list_brands(&state.db, query.search(), PAGE_SIZE, pagination.offset).await?;
    Ok(ok(pagination.into_page(items)))
}

/// GET /api/admin/brands/:id
pub async fn get_brand(
    State(state): State<AppState>,
    _operator: Operator,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let brand = db::found(db::brands::get_brand(&state.db, &id).await?, "Brand")?;
    let counts = db::brands::brand_counts(&state.db, &id).await?;
    let users = db::profiles::list_profiles_for_brand(&state.db, &id).await?;
    Ok(ok(BrandDetail { brand, counts, users }))
}

/// PATCH /api/admin/brands/:id `{plan}`
pub async fn update_plan(
    State(state): State<AppState>,
    Operator(operator): Operator,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdatePlanRequest>,
) -> ApiResult<impl IntoResponse> {
    let plan: Plan = req.plan.trim().parse().map_err(ApiError::BadRequest)?;
    db::brands::set_plan(&state.db, &id, plan).await?;
    info!("Brand {} moved to plan {:?} by {}", id, plan, operator.profile.email);

    let brand = db::found(db::brands::get_brand(&state.db, &id).await?, "Brand")?;
    Ok(ok(brand))
}

/// DELETE /api/admin/brands/:id (super admin only)
pub async fn delete_brand(
    State(state): State<AppState>,
    SuperAdmin(admin): SuperAdmin,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if id == admin.brand_id() {
        return Err(ApiError::BadRequest(
            "Operators cannot delete their own brand from the admin panel".to_string(),
        ));
    }

    let slugs = db::experiences::slugs_for_brand(&state.db, &id).await?;
    let rows_removed = db::brands::delete_brand(&state.db, &id).await?;
    purge_slugs(&state, &slugs).await;

    warn!("Brand {} deleted by admin {} ({} rows)", id, admin.profile.email, rows_removed);
    Ok(ok(super::brand::DeletedBrand {
        brand_id: id,
        rows_removed,
    }))
}

/// GET /api/admin/platform-feedback?page=
pub async fn list_platform_feedback(
    State(state): State<AppState>,
    _operator: Operator,
    QueryParams(query): QueryParams<AdminPageQuery>,
) -> ApiResult<impl IntoResponse> {
    let total = db::feedback::count_platform_feedback(&state.db).await?;
    let pagination = calculate_pagination(total, query.page.unwrap_or(1));
    let items = db::feedback::list_platform_feedback(&state.db, PAGE_SIZE, pagination.offset).await?;
    Ok(ok(pagination.into_page(items)))
}

/// GET /api/admin/stats
pub async fn platform_stats(State(state): State<AppState>, _operator: Operator) -> ApiResult<impl IntoResponse> {
    Ok(ok(db::feedback::platform_stats(&state.db).await?))
}
