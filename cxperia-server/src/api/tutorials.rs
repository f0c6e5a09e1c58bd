//! Tutorial endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use cxperia_common::db::Tutorial;
use serde::Deserialize;

use super::cache::purge_brand;
use super::{ok, validate, JsonBody};
use crate::auth::CurrentUser;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTutorialRequest {
    pub experience_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTutorialRequest {
    /// Blank detaches the tutorial from its experience
    pub experience_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_published: Option<bool>,
}

/// Check that an optional experience link points into the caller's brand
async fn linked_experience(
    state: &AppState,
    user: &CurrentUser,
    experience_id: Option<String>,
) -> ApiResult<Option<String>> {
    match validate::optional(experience_id) {
        Some(id) => {
            let experience = db::experiences::get_experience(&state.db, user.brand_id(), &id).await?;
            Ok(Some(experience.id))
        }
        None => Ok(None),
    }
}

fn optional_url(field: &str, value: Option<String>) -> ApiResult<Option<String>> {
    validate::optional(value)
        .map(|u| validate::http_url(field, &u))
        .transpose()
}

/// GET /api/tutorials
pub async fn list_tutorials(State(state): State<AppState>, user: CurrentUser) -> ApiResult<impl IntoResponse> {
    Ok(ok(db::tutorials::list_tutorials(&state.db, user.brand_id()).await?))
}

/// POST /api/tutorials
pub async fn create_tutorial(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(req): JsonBody<CreateTutorialRequest>,
) -> ApiResult<impl IntoResponse> {
    let now = Utc::now();
    let tutorial = Tutorial {
        id: db::new_id(),
        brand_id: user.brand_id().to_string(),
        experience_id: linked_experience(&state, &user, req.experience_id).await?,
        title: validate::required("Title", &req.title)?,
        description: validate::optional(req.description),
        video_url: optional_url("Video URL", req.video_url)?,
        thumbnail_url: optional_url("Thumbnail URL", req.thumbnail_url)?,
        is_published: req.is_published,
        created_at: now,
        updated_at: now,
    };

    db::tutorials::insert_tutorial(&state.db, &tutorial).await?;
    if tutorial.is_published {
        purge_brand(&state, user.brand_id()).await?;
    }
    Ok((StatusCode::CREATED, ok(tutorial)))
}

/// PATCH /api/tutorials/:id
pub async fn update_tutorial(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateTutorialRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut tutorial = db::tutorials::get_tutorial(&state.db, user.brand_id(), &id).await?;

    if req.experience_id.is_some() {
        tutorial.experience_id = linked_experience(&state, &user, req.experience_id).await?;
    }
    if let Some(title) = req.title {
        tutorial.title = validate::required("Title", &title)?;
    }
    validate::patch(&mut tutorial.description, req.description);
    if req.video_url.is_some() {
        tutorial.video_url = optional_url("Video URL", req.video_url)?;
    }
    if req.thumbnail_url.is_some() {
        tutorial.thumbnail_url = optional_url("Thumbnail URL", req.thumbnail_url)?;
    }
    if let Some(published) = req.is_published {
        tutorial.is_published = published;
    }
    tutorial.updated_at = Utc::now();

    db::tutorials::update_tutorial(&state.db, &tutorial).await?;
    purge_brand(&state, user.brand_id()).await?;
    Ok(ok(tutorial))
}

/// DELETE /api/tutorials/:id
pub async fn delete_tutorial(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if !db::tutorials::delete_tutorial(&state.db, user.brand_id(), &id).await? {
        return Err(ApiError::not_found("Tutorial"));
    }
    purge_brand(&state, user.brand_id()).await?;
    Ok(ok(()))
}
