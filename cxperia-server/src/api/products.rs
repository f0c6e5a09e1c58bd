//! Product catalogue endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use cxperia_common::db::Product;
use serde::Deserialize;
use sqlx::types::Json;

use super::cache::{purge_brand, purge_slugs};
use super::{ok, validate, JsonBody, QueryParams};
use crate::auth::CurrentUser;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, PageQuery, PAGE_SIZE};
use crate::AppState;

const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub usage_duration_days: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub usage_duration_days: Option<i64>,
}

fn image_urls(urls: Vec<String>) -> Result<Vec<String>, ApiError> {
    urls.iter()
        .filter(|u| !u.trim().is_empty())
        .map(|u| validate::http_url("Image URL", u))
        .collect()
}

fn currency(value: Option<String>) -> Result<String, ApiError> {
    match validate::optional(value) {
        None => Ok(DEFAULT_CURRENCY.to_string()),
        Some(c) if c.len() == 3 && c.chars().all(|ch| ch.is_ascii_alphabetic()) => Ok(c.to_uppercase()),
        Some(c) => Err(ApiError::BadRequest(format!("Invalid currency code '{}'", c))),
    }
}

/// GET /api/products?page=&search=
pub async fn list_products(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(query): QueryParams<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let total = db::products::count_products(&state.db, user.brand_id(), query.search()).await?;
    let pagination = calculate_pagination(total, query.page());
    let items = db::products::list_products(
        &state.db,
        user.brand_id(),
        query.search(),
        PAGE_SIZE,
        pagination.offset,
    )
    .await?;
    Ok(ok(pagination.into_page(items)))
}

/// POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(req): JsonBody<CreateProductRequest>,
) -> ApiResult<impl IntoResponse> {
    let now = Utc::now();
    let product = Product {
        id: db::new_id(),
        brand_id: user.brand_id().to_string(),
        name: validate::required("Product name", &req.name)?,
        description: validate::optional(req.description),
        category: validate::optional(req.category),
        image_urls: Json(image_urls(req.image_urls)?),
        price: validate::non_negative("Price", req.price)?,
        currency: currency(req.currency)?,
        usage_duration_days: validate::non_negative("Usage duration", req.usage_duration_days)?,
        created_at: now,
        updated_at: now,
    };

    db::products::insert_product(&state.db, &product).await?;
    purge_brand(&state, user.brand_id()).await?;
    Ok((StatusCode::CREATED, ok(product)))
}

/// GET /api/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let product = db::products::get_product(&state.db, user.brand_id(), &id).await?;
    Ok(ok(product))
}

/// PATCH /api/products/:id
pub async fn update_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateProductRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut product = db::products::get_product(&state.db, user.brand_id(), &id).await?;

    if let Some(name) = req.name {
        product.name = validate::required("Product name", &name)?;
    }
    validate::patch(&mut product.description, req.description);
    validate::patch(&mut product.category, req.category);
    if let Some(urls) = req.image_urls {
        product.image_urls = Json(image_urls(urls)?);
    }
    if req.price.is_some() {
        product.price = validate::non_negative("Price", req.price)?;
    }
    if req.currency.is_some() {
        product.currency = currency(req.currency)?;
    }
    if req.usage_duration_days.is_some() {
        product.usage_duration_days =
            validate::non_negative("Usage duration", req.usage_duration_days)?;
    }
    product.updated_at = Utc::now();

    db::products::update_product(&state.db, &product).await?;
    purge_brand(&state, user.brand_id()).await?;
    Ok(ok(product))
}

/// DELETE /api/products/:id (its experiences go with it)
///
/// Every slug of the brand is purged: the deleted product's own pages and
/// the product lists shown on the others.
pub async fn delete_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let slugs = db::experiences::slugs_for_brand(&state.db, user.brand_id()).await?;

    if !db::products::delete_product(&state.db, user.brand_id(), &id).await? {
        return Err(ApiError::not_found("Product"));
    }
    purge_slugs(&state, &slugs).await;
    Ok(ok(()))
}
