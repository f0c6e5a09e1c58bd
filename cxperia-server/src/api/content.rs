//! Experience content: usage steps, ingredients and feature toggles

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use cxperia_common::db::{Experience, Feature, Ingredient};
use serde::Deserialize;

use super::{ok, validate, JsonBody};
use crate::auth::CurrentUser;
use crate::db;
use crate::db::content::NewInstruction;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct InstructionInput {
    pub title: String,
    pub description: Option<String>,
    pub media_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceInstructionsRequest {
    pub instructions: Vec<InstructionInput>,
}

#[derive(Debug, Deserialize)]
pub struct CreateIngredientRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_allergen: bool,
    pub position: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateIngredientRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_allergen: Option<bool>,
    pub position: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceFeaturesRequest {
    /// Names of the features to enable; every other feature is disabled
    pub enabled: Vec<String>,
}

async fn owned_experience(state: &AppState, user: &CurrentUser, id: &str) -> ApiResult<Experience> {
    Ok(db::experiences::get_experience(&state.db, user.brand_id(), id).await?)
}

async fn purge_experience(state: &AppState, experience: &Experience) {
    if let Some(slug) = &experience.slug {
        state.cache.purge_slug(slug).await;
    }
}

/// GET /api/experiences/:id/instructions
pub async fn list_instructions(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let experience = owned_experience(&state, &user, &id).await?;
    Ok(ok(db::content::list_instructions(&state.db, &experience.id).await?))
}

/// PUT /api/experiences/:id/instructions
///
/// Full overwrite; steps are renumbered 1..n in the order given.
pub async fn replace_instructions(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<ReplaceInstructionsRequest>,
) -> ApiResult<impl IntoResponse> {
    let experience = owned_experience(&state, &user, &id).await?;

    let steps = req
        .instructions
        .into_iter()
        .enumerate()
        .map(|(index, step)| {
            Ok(NewInstruction {
                title: validate::required(&format!("Step {} title", index + 1), &step.title)?,
                description: validate::optional(step.description),
                media_url: validate::optional(step.media_url)
                    .map(|u| validate::http_url("Media URL", &u))
                    .transpose()?,
            })
        })
        .collect::<ApiResult<Vec<_>>>()?;

    let stored = db::content::replace_instructions(&state.db, &experience.id, &steps).await?;
    purge_experience(&state, &experience).await;
    Ok(ok(stored))
}

/// GET /api/experiences/:id/ingredients
pub async fn list_ingredients(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let experience = owned_experience(&state, &user, &id).await?;
    Ok(ok(db::content::list_ingredients(&state.db, &experience.id).await?))
}

/// POST /api/experiences/:id/ingredients
pub async fn create_ingredient(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<CreateIngredientRequest>,
) -> ApiResult<impl IntoResponse> {
    let experience = owned_experience(&state, &user, &id).await?;

    let position = match validate::non_negative("Position", req.position)? {
        Some(position) => position,
        None => db::content::next_ingredient_position(&state.db, &experience.id).await?,
    };
    let ingredient = Ingredient {
        id: db::new_id(),
        brand_id: user.brand_id().to_string(),
        experience_id: experience.id.clone(),
        name: validate::required("Ingredient name", &req.name)?,
        description: validate::optional(req.description),
        is_allergen: req.is_allergen,
        position,
    };

    db::content::insert_ingredient(&state.db, &ingredient).await?;
    purge_experience(&state, &experience).await;
    Ok((StatusCode::CREATED, ok(ingredient)))
}

/// PATCH /api/ingredients/:id
pub async fn update_ingredient(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateIngredientRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut ingredient = db::content::get_ingredient(&state.db, user.brand_id(), &id).await?;

    if let Some(name) = req.name {
        ingredient.name = validate::required("Ingredient name", &name)?;
    }
    validate::patch(&mut ingredient.description, req.description);
    if let Some(allergen) = req.is_allergen {
        ingredient.is_allergen = allergen;
    }
    if let Some(position) = validate::non_negative("Position", req.position)? {
        ingredient.position = position;
    }

    db::content::update_ingredient(&state.db, &ingredient).await?;
    let experience = owned_experience(&state, &user, &ingredient.experience_id).await?;
    purge_experience(&state, &experience).await;
    Ok(ok(ingredient))
}

/// DELETE /api/ingredients/:id
///
/// An ingredient of another brand is reported as missing.
pub async fn delete_ingredient(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let ingredient = db::content::get_ingredient(&state.db, user.brand_id(), &id).await?;
    if !db::content::delete_ingredient(&state.db, user.brand_id(), &id).await? {
        return Err(ApiError::not_found("Ingredient"));
    }
    let experience = owned_experience(&state, &user, &ingredient.experience_id).await?;
    purge_experience(&state, &experience).await;
    Ok(ok(()))
}

/// GET /api/experiences/:id/features
pub async fn list_features(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let experience = owned_experience(&state, &user, &id).await?;
    Ok(ok(db::content::list_features(&state.db, &experience.id).await?))
}

/// PUT /api/experiences/:id/features
pub async fn replace_features(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<ReplaceFeaturesRequest>,
) -> ApiResult<impl IntoResponse> {
    let experience = owned_experience(&state, &user, &id).await?;

    let mut enabled = Vec::with_capacity(req.enabled.len());
    for name in &req.enabled {
        let feature: Feature = name.trim().parse().map_err(ApiError::BadRequest)?;
        if !enabled.contains(&feature) {
            enabled.push(feature);
        }
    }

    let flags = db::content::replace_features(&state.db, &experience.id, &enabled).await?;
    purge_experience(&state, &experience).await;
    Ok(ok(flags))
}
