//! Upload metadata endpoints
//!
//! Media is uploaded straight to the hosting provider by the client; the
//! backend records where it ended up.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use cxperia_common::db::Upload;
use serde::Deserialize;

use super::{ok, validate, JsonBody, QueryParams};
use crate::auth::CurrentUser;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const RESOURCE_TYPES: [&str; 2] = ["image", "video"];

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    pub resource_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUploadRequest {
    pub url: String,
    pub public_id: Option<String>,
    pub resource_type: Option<String>,
    pub bytes: Option<i64>,
    pub format: Option<String>,
}

fn resource_type(value: Option<String>) -> ApiResult<Option<String>> {
    match validate::optional(value).map(|v| v.to_lowercase()) {
        Some(kind) if RESOURCE_TYPES.contains(&kind.as_str()) => Ok(Some(kind)),
        Some(kind) => Err(ApiError::BadRequest(format!(
            "resource_type must be image or video, got '{}'",
            kind
        ))),
        None => Ok(None),
    }
}

/// GET /api/uploads?resource_type=
pub async fn list_uploads(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(query): QueryParams<UploadQuery>,
) -> ApiResult<impl IntoResponse> {
    let kind = resource_type(query.resource_type)?;
    Ok(ok(db::uploads::list_uploads(&state.db, user.brand_id(), kind.as_deref()).await?))
}

/// POST /api/uploads
pub async fn register_upload(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(req): JsonBody<RegisterUploadRequest>,
) -> ApiResult<impl IntoResponse> {
    let upload = Upload {
        id: db::new_id(),
        brand_id: user.brand_id().to_string(),
        url: validate::http_url("url", &req.url)?,
        public_id: validate::optional(req.public_id),
        resource_type: resource_type(req.resource_type)?.unwrap_or_else(|| "image".to_string()),
        bytes: validate::non_negative("bytes", req.bytes)?,
        format: validate::optional(req.format),
        created_at: Utc::now(),
    };
    db::uploads::insert_upload(&state.db, &upload).await?;
    Ok((StatusCode::CREATED, ok(upload)))
}

/// DELETE /api/uploads/:id
pub async fn delete_upload(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if !db::uploads::delete_upload(&state.db, user.brand_id(), &id).await? {
        return Err(ApiError::not_found("Upload"));
    }
    Ok(ok(()))
}
