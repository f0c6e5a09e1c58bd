//! Public viewer endpoints (behind the `x-api-secret` middleware)
//!
//! Read routes are served from `PublicCache`; only successful lookups are
//! cached, so an unpublished or unknown slug is re-checked every time.

use std::future::Future;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use cxperia_common::db::{Brand, CustomerFeedback, DigitalInstruction, Experience, Ingredient, Product};
use cxperia_common::slug::is_valid_slug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{ok, validate, JsonBody};
use crate::cache::PublicRoute;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const MAX_COMMENT_LEN: usize = 2000;

/// Brand fields shown on a public page
#[derive(Debug, Serialize)]
pub struct PublicBrand {
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub website: Option<String>,
}

impl From<Brand> for PublicBrand {
    fn from(brand: Brand) -> Self {
        PublicBrand {
            name: brand.name,
            slug: brand.slug,
            logo_url: brand.logo_url,
            primary_color: brand.primary_color,
            website: brand.website,
        }
    }
}

/// Everything the viewer needs to render one experience
#[derive(Debug, Serialize)]
pub struct PublicExperience {
    pub id: String,
    pub slug: String,
    pub theme: String,
    pub primary_color: Option<String>,
    pub tutorial_video_url: Option<String>,
    pub support_email: Option<String>,
    pub support_phone: Option<String>,
    pub support_url: Option<String>,
    pub brand: PublicBrand,
    pub product: Product,
    pub instructions: Vec<DigitalInstruction>,
    pub ingredients: Vec<Ingredient>,
    pub features: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PublicFeedbackRequest {
    pub rating: i64,
    pub comment: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScanRequest {
    pub visitor_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanResult {
    pub counted: bool,
    pub scan_count: i64,
}

/// Serve `route` for `slug` from the cache, loading and storing on a miss
async fn cached<F, Fut>(state: &AppState, route: PublicRoute, slug: &str, load: F) -> ApiResult<Value>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ApiResult<Value>>,
{
    if let Some(hit) = state.cache.get(route, slug).await {
        debug!("Public cache hit: {}", route.key(slug));
        return Ok((*hit).clone());
    }

    let value = load().await?;
    state.cache.insert(route, slug, value.clone()).await;
    Ok(value)
}

fn to_value<T: Serialize>(data: &T) -> ApiResult<Value> {
    serde_json::to_value(data).map_err(|e| ApiError::Internal(format!("serialization failed: {e}")))
}

/// Published experience behind `slug`; malformed slugs never reach the database
async fn published(state: &AppState, slug: &str) -> ApiResult<Experience> {
    if !is_valid_slug(slug) {
        return Err(ApiError::not_found("Experience"));
    }
    Ok(db::experiences::get_published_by_slug(&state.db, slug).await?)
}

/// GET /api/public/experiences/:slug
pub async fn get_experience(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let value = cached(&state, PublicRoute::Experience, &slug, || async {
        let experience = published(&state, &slug).await?;
        let brand = db::found(db::brands::get_brand(&state.db, &experience.brand_id).await?, "Brand")?;
        let product = db::products::get_product(&state.db, &experience.brand_id, &experience.product_id).await?;
        let instructions = db::content::list_instructions(&state.db, &experience.id).await?;
        let ingredients = db::content::list_ingredients(&state.db, &experience.id).await?;
        let flags = db::content::list_features(&state.db, &experience.id).await?;

        to_value(&PublicExperience {
            id: experience.id,
            slug: slug.clone(),
            theme: experience.theme,
            primary_color: experience.primary_color.or_else(|| brand.primary_color.clone()),
            tutorial_video_url: experience.tutorial_video_url,
            support_email: experience.support_email,
            support_phone: experience.support_phone,
            support_url: experience.support_url,
            brand: brand.into(),
            product,
            instructions,
            ingredients,
            features: db::content::enabled_names(&flags),
        })
    })
    .await?;
    Ok(ok(value))
}

/// GET /api/public/experiences/:slug/products
pub async fn list_products(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let value = cached(&state, PublicRoute::Products, &slug, || async {
        let experience = published(&state, &slug).await?;
        to_value(&db::products::list_all_products(&state.db, &experience.brand_id).await?)
    })
    .await?;
    Ok(ok(value))
}

/// GET /api/public/experiences/:slug/tutorials
pub async fn list_tutorials(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let value = cached(&state, PublicRoute::Tutorials, &slug, || async {
        let experience = published(&state, &slug).await?;
        to_value(&db::tutorials::list_public_tutorials(&state.db, &experience.brand_id, &experience.id).await?)
    })
    .await?;
    Ok(ok(value))
}

/// POST /api/public/experiences/:slug/feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    JsonBody(req): JsonBody<PublicFeedbackRequest>,
) -> ApiResult<impl IntoResponse> {
    if !(1..=5).contains(&req.rating) {
        return Err(ApiError::BadRequest("Rating must be between 1 and 5".to_string()));
    }
    let comment = validate::optional(req.comment);
    if comment.as_ref().is_some_and(|c| c.chars().count() > MAX_COMMENT_LEN) {
        return Err(ApiError::BadRequest(format!(
            "Comment must be at most {} characters",
            MAX_COMMENT_LEN
        )));
    }

    let experience = published(&state, &slug).await?;
    let feedback = CustomerFeedback {
        id: db::new_id(),
        brand_id: experience.brand_id,
        experience_id: experience.id,
        rating: req.rating,
        comment,
        customer_name: validate::optional(req.customer_name),
        customer_email: validate::optional_email(req.customer_email)?,
        created_at: Utc::now(),
    };
    db::feedback::insert_customer_feedback(&state.db, &feedback).await?;
    Ok((StatusCode::CREATED, ok(feedback)))
}

/// Identity used for scan deduplication
///
/// The client-held visitor id when sent, else the forwarded address and user
/// agent pair.
fn visitor_key(headers: &HeaderMap, visitor_id: Option<String>) -> String {
    if let Some(id) = validate::optional(visitor_id) {
        return format!("id:{}", id);
    }
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .unwrap_or("");
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    format!("net:{}|{}", forwarded, user_agent)
}

/// POST /api/public/experiences/:slug/scan `{visitor_id?}`
///
/// Counts the scan unless the same visitor scanned this slug within the
/// dedup window.
pub async fn record_scan(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    body: Option<JsonBody<ScanRequest>>,
) -> ApiResult<impl IntoResponse> {
    let experience = published(&state, &slug).await?;
    let visitor_id = body.and_then(|JsonBody(req)| req.visitor_id);
    let visitor = visitor_key(&headers, visitor_id);

    if !state.scans.should_count(&slug, &visitor).await {
        debug!("Repeat scan of {} ignored", slug);
        return Ok(ok(ScanResult {
            counted: false,
            scan_count: experience.scan_count,
        }));
    }

    let scan_count = match db::experiences::increment_scan_count(&state.db, &experience.id).await {
        Ok(count) => count,
        Err(e) => {
            // Not counted, so the visitor's retry must not be deduplicated
            state.scans.forget(&slug, &visitor).await;
            return Err(e.into());
        }
    };

    let user_agent = headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok());
    let referrer = headers.get(header::REFERER).and_then(|v| v.to_str().ok());
    if let Err(e) =
        db::feedback::insert_scan_event(&state.db, &experience.brand_id, &experience.id, user_agent, referrer)
            .await
    {
        warn!("Could not log scan event for {}: {}", slug, e);
    }

    Ok(ok(ScanResult {
        counted: true,
        scan_count,
    }))
}
