//! Password hashing using Argon2id.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::ApiError;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Hash a plaintext password into a PHC-format string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch; a malformed stored hash is an internal
/// error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(ApiError::Internal(format!("verify error: {e}"))),
    }
}

/// `hash_password` on the blocking pool
pub async fn hash_password_async(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))?
}

/// `verify_password` on the blocking pool
pub async fn verify_password_async(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("verify task failed: {e}")))?
}

/// Reject passwords shorter than `MIN_PASSWORD_LEN` characters
pub fn check_password_strength(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hash = hash_password("hunter22").unwrap();
        assert!(!verify_password("hunter23", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        assert_ne!(hash_password("hunter22").unwrap(), hash_password("hunter22").unwrap());
    }

    #[test]
    fn malformed_hash_is_error() {
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }

    #[test]
    fn short_password_rejected() {
        assert!(check_password_strength("12345").is_err());
        assert!(check_password_strength("123456").is_ok());
    }
}
