//! Experience endpoints, including QR code issuance

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use cxperia_common::db::{DigitalInstruction, Experience, FeatureFlag, Ingredient, Product};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ok, validate, JsonBody};
use crate::auth::CurrentUser;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::{qr, AppState};

const DEFAULT_THEME: &str = "light";

#[derive(Debug, Deserialize)]
pub struct CreateExperienceRequest {
    pub product_id: String,
    pub theme: Option<String>,
    pub primary_color: Option<String>,
    pub tutorial_video_url: Option<String>,
    pub support_email: Option<String>,
    pub support_phone: Option<String>,
    pub support_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateExperienceRequest {
    pub is_published: Option<bool>,
    pub theme: Option<String>,
    pub primary_color: Option<String>,
    pub tutorial_video_url: Option<String>,
    pub support_email: Option<String>,
    pub support_phone: Option<String>,
    pub support_url: Option<String>,
}

/// Experience with everything the editor shows
#[derive(Debug, Serialize)]
pub struct ExperienceFull {
    #[serde(flatten)]
    pub experience: Experience,
    pub product: Product,
    pub instructions: Vec<DigitalInstruction>,
    pub ingredients: Vec<Ingredient>,
    pub features: Vec<FeatureFlag>,
}

#[derive(Debug, Serialize)]
pub struct QrPayload {
    pub qr_code_url: String,
    pub public_url: Option<String>,
    pub slug: Option<String>,
}

impl QrPayload {
    fn from_experience(experience: Experience) -> ApiResult<Self> {
        let qr_code_url = experience
            .qr_code_url
            .ok_or_else(|| ApiError::Internal(format!("QR code missing for {}", experience.id)))?;
        Ok(QrPayload {
            qr_code_url,
            public_url: experience.public_url,
            slug: experience.slug,
        })
    }
}

fn optional_url(field: &str, value: Option<String>) -> ApiResult<Option<String>> {
    validate::optional(value)
        .map(|u| validate::http_url(field, &u))
        .transpose()
}

/// GET /api/experiences
pub async fn list_experiences(State(state): State<AppState>, user: CurrentUser) -> ApiResult<impl IntoResponse> {
    let experiences = db::experiences::list_experiences(&state.db, user.brand_id()).await?;
    Ok(ok(experiences))
}

/// POST /api/experiences
///
/// New experiences start unpublished and without a slug; both come with
/// the first QR code.
pub async fn create_experience(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(req): JsonBody<CreateExperienceRequest>,
) -> ApiResult<impl IntoResponse> {
    let product = db::products::get_product(&state.db, user.brand_id(), req.product_id.trim()).await?;

    let now = Utc::now();
    let experience = Experience {
        id: db::new_id(),
        brand_id: user.brand_id().to_string(),
        product_id: product.id,
        slug: None,
        is_published: false,
        theme: validate::optional(req.theme).unwrap_or_else(|| DEFAULT_THEME.to_string()),
        primary_color: validate::color(req.primary_color)?,
        public_url: None,
        qr_code_url: None,
        tutorial_video_url: optional_url("Tutorial video URL", req.tutorial_video_url)?,
        support_email: validate::optional_email(req.support_email)?,
        support_phone: validate::optional(req.support_phone),
        support_url: optional_url("Support URL", req.support_url)?,
        scan_count: 0,
        created_at: now,
        updated_at: now,
    };

    db::experiences::insert_experience(&state.db, &experience).await?;
    Ok((StatusCode::CREATED, ok(experience)))
}

/// GET /api/experiences/:id
pub async fn get_experience(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let experience = db::experiences::get_experience(&state.db, user.brand_id(), &id).await?;
    Ok(ok(experience))
}

/// GET /api/experiences/:id/full
pub async fn get_experience_full(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let experience = db::experiences::get_experience(&state.db, user.brand_id(), &id).await?;
    let product = db::products::get_product(&state.db, user.brand_id(), &experience.product_id).await?;
    let instructions = db::content::list_instructions(&state.db, &experience.id).await?;
    let ingredients = db::content::list_ingredients(&state.db, &experience.id).await?;
    let features = db::content::list_features(&state.db, &experience.id).await?;

    Ok(ok(ExperienceFull {
        experience,
        product,
        instructions,
        ingredients,
        features,
    }))
}

/// PATCH /api/experiences/:id
pub async fn update_experience(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateExperienceRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut experience = db::experiences::get_experience(&state.db, user.brand_id(), &id).await?;

    if let Some(published) = req.is_published {
        experience.is_published = published;
    }
    if let Some(theme) = req.theme {
        experience.theme = validate::required("Theme", &theme)?;
    }
    if req.primary_color.is_some() {
        experience.primary_color = validate::color(req.primary_color)?;
    }
    if req.tutorial_video_url.is_some() {
        experience.tutorial_video_url = optional_url("Tutorial video URL", req.tutorial_video_url)?;
    }
    if req.support_email.is_some() {
        experience.support_email = validate::optional_email(req.support_email)?;
    }
    validate::patch(&mut experience.support_phone, req.support_phone);
    if req.support_url.is_some() {
        experience.support_url = optional_url("Support URL", req.support_url)?;
    }
    experience.updated_at = Utc::now();

    db::experiences::update_experience(&state.db, &experience).await?;

    if let Some(slug) = &experience.slug {
        state.cache.purge_slug(slug).await;
        if req.is_published == Some(false) {
            info!("Experience {} ({}) unpublished", experience.id, slug);
        }
    }
    Ok(ok(experience))
}

/// DELETE /api/experiences/:id
pub async fn delete_experience(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let experience = db::experiences::get_experience(&state.db, user.brand_id(), &id).await?;
    if !db::experiences::delete_experience(&state.db, user.brand_id(), &id).await? {
        return Err(ApiError::not_found("Experience"));
    }
    if let Some(slug) = &experience.slug {
        state.cache.purge_slug(slug).await;
    }
    Ok(ok(()))
}

/// POST /api/experiences/:id/qr
///
/// Issuing is idempotent: an experience that already has a QR code gets the
/// stored one back unchanged. Otherwise a slug is assigned (if missing), the
/// public URL is encoded and stored, and the experience is published.
pub async fn issue_qr_code(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let experience = db::experiences::get_experience(&state.db, user.brand_id(), &id).await?;
    if experience.qr_code_url.is_some() {
        return Ok(ok(QrPayload::from_experience(experience)?));
    }

    let slug = match &experience.slug {
        Some(slug) => slug.clone(),
        None => {
            let product =
                db::products::get_product(&state.db, user.brand_id(), &experience.product_id).await?;
            let pool = &state.db;
            cxperia_common::slug::free_slug(&product.name, move |candidate| async move {
                db::experiences::slug_taken(pool, &candidate).await
            })
            .await?
        }
    };
    let public_url = qr::public_url(state.config.public_base_url(), &slug);
    let qr_code_url = qr::qr_data_uri(&public_url)?;

    db::experiences::store_qr_code(&state.db, &experience.id, &slug, &public_url, &qr_code_url).await?;

    // Re-read: a concurrent request may have stored its code first
    let experience = db::experiences::get_experience(&state.db, user.brand_id(), &id).await?;
    if let Some(slug) = &experience.slug {
        state.cache.purge_slug(slug).await;
        info!("Issued QR code for experience {} at {}", experience.id, slug);
    }
    Ok(ok(QrPayload::from_experience(experience)?))
}
