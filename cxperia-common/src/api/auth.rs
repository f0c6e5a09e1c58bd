//! Shared-secret check for the public viewer endpoints
//!
//! The public experience viewer calls read endpoints with an `x-api-secret`
//! header. The secret is a non-zero i64 kept in the `settings` table under
//! `api_shared_secret`; the value 0 disables the check.
//!
//! This module holds only pure functions and database operations; the axum
//! middleware that applies them lives in the server crate.

use sqlx::SqlitePool;

/// Header carrying the public read secret
pub const SECRET_HEADER: &str = "x-api-secret";

/// Settings key under which the secret is stored
pub const SECRET_SETTING_KEY: &str = "api_shared_secret";

/// Public secret validation failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiAuthError {
    /// Header absent
    MissingSecret,

    /// Header present but does not match
    InvalidSecret,

    /// Database error loading the shared secret
    DatabaseError(String),
}

impl std::fmt::Display for ApiAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiAuthError::MissingSecret => write!(f, "Missing {} header", SECRET_HEADER),
            ApiAuthError::InvalidSecret => write!(f, "Invalid API secret"),
            ApiAuthError::DatabaseError(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for ApiAuthError {}

/// Load the shared secret, generating and storing one if absent
pub async fn load_shared_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    let result: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(SECRET_SETTING_KEY)
        .fetch_optional(db)
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    match result {
        Some((value,)) => value
            .trim()
            .parse::<i64>()
            .map_err(|e| ApiAuthError::DatabaseError(format!("Invalid i64: {}", e))),
        None => initialize_shared_secret(db).await,
    }
}

/// Generate a random non-zero secret and store it
pub async fn initialize_shared_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    use rand::Rng;

    let mut rng = rand::thread_rng();
    let secret: i64 = loop {
        let val = rng.gen::<i64>();
        if val != 0 {
            break val;
        }
    };

    store_shared_secret(db, secret).await?;
    Ok(secret)
}

/// Overwrite the stored secret (0 disables the check)
pub async fn store_shared_secret(db: &SqlitePool, secret: i64) -> Result<(), ApiAuthError> {
    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(SECRET_SETTING_KEY)
        .bind(secret.to_string())
        .execute(db)
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;
    Ok(())
}

/// Validate a provided header value against the shared secret
///
/// ```
/// use cxperia_common::api::auth::{validate_secret, ApiAuthError};
///
/// assert!(validate_secret(Some("42"), 42).is_ok());
/// assert_eq!(validate_secret(Some("41"), 42), Err(ApiAuthError::InvalidSecret));
/// assert_eq!(validate_secret(None, 42), Err(ApiAuthError::MissingSecret));
/// // 0 disables checking
/// assert!(validate_secret(None, 0).is_ok());
/// ```
pub fn validate_secret(provided: Option<&str>, shared_secret: i64) -> Result<(), ApiAuthError> {
    if shared_secret == 0 {
        return Ok(());
    }

    let provided = provided.ok_or(ApiAuthError::MissingSecret)?;
    match provided.trim().parse::<i64>() {
        Ok(value) if value == shared_secret => Ok(()),
        _ => Err(ApiAuthError::InvalidSecret),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_secret_accepted() {
        assert!(validate_secret(Some("123456789"), 123456789).is_ok());
        assert!(validate_secret(Some(" -5 "), -5).is_ok());
    }

    #[test]
    fn test_wrong_or_garbage_secret_rejected() {
        assert_eq!(
            validate_secret(Some("987654321"), 123456789),
            Err(ApiAuthError::InvalidSecret)
        );
        assert_eq!(
            validate_secret(Some("not-a-number"), 123456789),
            Err(ApiAuthError::InvalidSecret)
        );
    }

    #[test]
    fn test_missing_secret_rejected() {
        assert_eq!(validate_secret(None, 1), Err(ApiAuthError::MissingSecret));
    }

    #[test]
    fn test_zero_disables_check() {
        assert!(validate_secret(None, 0).is_ok());
        assert!(validate_secret(Some("anything"), 0).is_ok());
    }
}
