//! Shared API response types
//!
//! Every endpoint answers with the same envelope:
//! `{"success": true, "data": ...}` or `{"success": false, "error": "..."}`.

use serde::{Deserialize, Serialize};

/// Uniform response envelope
///
/// # Examples
///
/// ```
/// use cxperia_common::api::types::ApiResponse;
///
/// let ok = serde_json::to_value(ApiResponse::ok(5)).unwrap();
/// assert_eq!(ok["success"], true);
/// assert_eq!(ok["data"], 5);
/// assert!(ok.get("error").is_none());
///
/// let err = serde_json::to_value(ApiResponse::<()>::err("nope")).unwrap();
/// assert_eq!(err["success"], false);
/// assert_eq!(err["error"], "nope");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed response carrying a human-readable message
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// One page of a list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}
