//! Brand-scoped queries
//!
//! Every lookup of a brand-owned row takes the caller's `brand_id` and treats
//! a row owned by another brand exactly like a missing one.

pub mod brands;
pub mod content;
pub mod experiences;
pub mod feedback;
pub mod products;
pub mod profiles;
pub mod sessions;
pub mod tutorials;
pub mod uploads;

use cxperia_common::{Error, Result};

/// New row id (UUIDv4 string)
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Convert an optional row into `NotFound`
pub(crate) fn found<T>(row: Option<T>, what: &str) -> Result<T> {
    row.ok_or_else(|| Error::NotFound(format!("{} not found", what)))
}

/// `%term%` pattern for LIKE searches, with wildcards in the term escaped
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
