//! Session cookie construction and parsing

use axum::http::{header, HeaderMap};
use cookie::{Cookie, SameSite};
use cxperia_common::config::MAX_SESSION_TTL_HOURS;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "cxperia_session";

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(token: &str, ttl_hours: i64, secure: bool) -> String {
    let ttl_hours = ttl_hours.clamp(0, MAX_SESSION_TTL_HOURS);
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::hours(ttl_hours))
        .build()
        .to_string()
}

/// `Set-Cookie` value that clears the session cookie
pub fn clear_session_cookie(secure: bool) -> String {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .expires(cookie::time::OffsetDateTime::UNIX_EPOCH)
        .max_age(cookie::time::Duration::ZERO)
        .build()
        .to_string()
}

/// Session token from `Authorization: Bearer` or the session cookie
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| Cookie::split_parse(v.to_string()))
        .filter_map(|c| c.ok())
        .find(|c| c.name() == SESSION_COOKIE && !c.value().is_empty())
        .map(|c| c.value().to_string())
}
