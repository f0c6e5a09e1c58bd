//! Customer feedback, analytics and platform feedback for brand users

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use cxperia_common::db::PlatformFeedback;
use serde::{Deserialize, Serialize};

use super::{ok, validate, JsonBody, QueryParams};
use crate::auth::CurrentUser;
use crate::db;
use crate::db::feedback::{AnalyticsTotals, ExperienceStats};
use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, PAGE_SIZE};
use crate::AppState;

const MAX_MESSAGE_LEN: usize = 5000;

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackQuery {
    pub page: Option<i64>,
    pub experience_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsOverview {
    pub totals: AnalyticsTotals,
    pub experiences: Vec<ExperienceStats>,
}

#[derive(Debug, Deserialize)]
pub struct PlatformFeedbackRequest {
    pub category: Option<String>,
    pub message: String,
}

/// GET /api/feedback?page=&experience_id=
pub async fn list_feedback(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(query): QueryParams<FeedbackQuery>,
) -> ApiResult<impl IntoResponse> {
    let experience_id = validate::optional(query.experience_id);
    let total =
        db::feedback::count_customer_feedback(&state.db, user.brand_id(), experience_id.as_deref()).await?;
    let pagination = calculate_pagination(total, query.page.unwrap_or(1));
    let items = db::feedback::list_customer_feedback(
        &state.db,
        user.brand_id(),
        experience_id.as_deref(),
        PAGE_SIZE,
        pagination.offset,
    )
    .await?;
    Ok(ok(pagination.into_page(items)))
}

/// GET /api/analytics/overview
pub async fn analytics_overview(State(state): State<AppState>, user: CurrentUser) -> ApiResult<impl IntoResponse> {
    let totals = db::feedback::analytics_totals(&state.db, user.brand_id()).await?;
    let experiences = db::feedback::experience_stats(&state.db, user.brand_id()).await?;
    Ok(ok(AnalyticsOverview { totals, experiences }))
}

/// POST /api/platform-feedback
pub async fn submit_platform_feedback(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(req): JsonBody<PlatformFeedbackRequest>,
) -> ApiResult<impl IntoResponse> {
    let message = validate::required("Message", &req.message)?;
    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(ApiError::BadRequest(format!(
            "Message must be at most {} characters",
            MAX_MESSAGE_LEN
        )));
    }

    let feedback = PlatformFeedback {
        id: db::new_id(),
        brand_id: user.brand_id().to_string(),
        profile_id: Some(user.profile.id.clone()),
        category: validate::optional(req.category).unwrap_or_else(|| "general".to_string()),
        message,
        created_at: Utc::now(),
    };
    db::feedback::insert_platform_feedback(&state.db, &feedback).await?;
    Ok((StatusCode::CREATED, ok(feedback)))
}
