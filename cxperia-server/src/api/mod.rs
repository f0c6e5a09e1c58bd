//! HTTP API handlers

pub mod admin;
pub mod auth;
pub mod brand;
pub mod cache;
pub mod content;
pub mod experiences;
pub mod feedback;
pub mod health;
pub mod products;
pub mod public;
pub mod public_auth;
pub mod tutorials;
pub mod uploads;
pub mod validate;

use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use cxperia_common::api::types::ApiResponse;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub use health::health_routes;
pub use public_auth::public_secret_middleware;

/// Successful JSON envelope
pub type Envelope<T> = Json<ApiResponse<T>>;

/// Wrap `data` in a `{success: true, data}` envelope
pub fn ok<T>(data: T) -> Envelope<T> {
    Json(ApiResponse::ok(data))
}

/// JSON request body whose rejections use the API error envelope (400)
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))?;
        Ok(JsonBody(value))
    }
}

/// Query string whose rejections use the API error envelope (400)
pub struct QueryParams<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid query string: {}", e.body_text())))?;
        Ok(QueryParams(value))
    }
}
