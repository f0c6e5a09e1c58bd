//! Request field validation

use crate::error::ApiError;

/// Trimmed value of a required text field
pub fn required(field: &str, value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

/// Trimmed optional text; blank becomes `None`
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Apply a PATCH field: absent keeps the current value, blank clears it
pub fn patch(target: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        *target = optional(Some(value));
    }
}

/// Normalized (trimmed, lowercase) email address
pub fn email(value: &str) -> Result<String, ApiError> {
    let email = value.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(ApiError::BadRequest("A valid email address is required".to_string()));
    }
    Ok(email)
}

/// Optional email, validated when present
pub fn optional_email(value: Option<String>) -> Result<Option<String>, ApiError> {
    optional(value).map(|v| email(&v)).transpose()
}

/// `http://` or `https://` URL
pub fn http_url(field: &str, value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !value.contains(char::is_whitespace) => {
            Ok(value.to_string())
        }
        _ => Err(ApiError::BadRequest(format!("{} must be an http(s) URL", field))),
    }
}

/// Hex colour such as `#aabbcc` or `#abc`
pub fn color(value: Option<String>) -> Result<Option<String>, ApiError> {
    match optional(value) {
        None => Ok(None),
        Some(c) => {
            let hex = c.strip_prefix('#').unwrap_or("");
            if (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
                Ok(Some(c.to_lowercase()))
            } else {
                Err(ApiError::BadRequest(format!("Invalid colour '{}'", c)))
            }
        }
    }
}

/// Reject negative numbers
pub fn non_negative<T: PartialOrd + Default + Copy>(field: &str, value: Option<T>) -> Result<Option<T>, ApiError> {
    match value {
        Some(v) if v < T::default() => Err(ApiError::BadRequest(format!("{} must not be negative", field))),
        other => Ok(other),
    }
}
