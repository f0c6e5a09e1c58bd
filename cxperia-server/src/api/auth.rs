//! Signup, login and session endpoints

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use cxperia_common::db::{Brand, Plan, Profile, Role};
use cxperia_common::slug;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ok, validate, JsonBody};
use crate::auth::{cookies, password, session, CurrentUser};
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub brand_name: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Body of a successful signup or login
///
/// The token is also set as an HttpOnly cookie; returning it lets non-browser
/// clients use `Authorization: Bearer`.
#[derive(Debug, Serialize)]
pub struct SessionPayload {
    pub token: String,
    pub profile: Profile,
    pub brand: Brand,
}

#[derive(Debug, Serialize)]
pub struct MePayload {
    pub profile: Profile,
    pub brand: Brand,
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    let brand_name = validate::required("Brand name", &req.brand_name)?;
    let email = validate::email(&req.email)?;
    password::check_password_strength(&req.password)?;

    if db::profiles::get_profile_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::Conflict("An account with this email already exists".to_string()));
    }

    let password_hash = password::hash_password_async(req.password).await?;
    let pool = &state.db;
    let brand_slug = slug::free_slug(&brand_name, move |candidate| async move {
        db::brands::slug_taken(pool, &candidate).await
    })
    .await?;
    let now = Utc::now();

    let brand = Brand {
        id: db::new_id(),
        name: brand_name,
        slug: brand_slug,
        logo_url: None,
        primary_color: None,
        plan: Plan::Free,
        contact_email: Some(email.clone()),
        contact_phone: None,
        website: None,
        created_at: now,
        updated_at: now,
    };
    let profile = Profile {
        id: db::new_id(),
        brand_id: brand.id.clone(),
        email,
        password_hash,
        full_name: validate::optional(req.full_name),
        role: Role::BrandAdmin,
        created_at: now,
        updated_at: now,
    };

    let mut tx = state.db.begin().await?;
    db::brands::insert_brand(&mut *tx, &brand).await?;
    db::profiles::insert_profile(&mut *tx, &profile).await?;
    let token = session::start_session(&mut *tx, &profile.id, state.config.session_ttl_hours).await?;
    tx.commit().await?;

    info!("New brand {} ({}) signed up as {}", brand.name, brand.id, profile.email);

    let mailer = state.mailer.clone();
    let (to, brand_name) = (profile.email.clone(), brand.name.clone());
    tokio::spawn(async move {
        mailer.send_welcome(&to, &brand_name).await;
    });

    let cookie = cookies::session_cookie(&token, state.config.session_ttl_hours, state.config.cookie_secure);
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        ok(SessionPayload { token, profile, brand }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let email = req.email.trim().to_lowercase();
    let profile = db::profiles::get_profile_by_email(&state.db, &email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password_async(req.password, profile.password_hash.clone()).await? {
        info!("Failed login for {}", email);
        return Err(invalid());
    }

    let brand = db::found(db::brands::get_brand(&state.db, &profile.brand_id).await?, "Brand")?;
    let token = session::start_session(&state.db, &profile.id, state.config.session_ttl_hours).await?;

    let cookie = cookies::session_cookie(&token, state.config.session_ttl_hours, state.config.cookie_secure);
    Ok(([(header::SET_COOKIE, cookie)], ok(SessionPayload { token, profile, brand })))
}

/// POST /api/auth/logout
///
/// Always succeeds; an unknown or missing token just clears the cookie.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<impl IntoResponse> {
    if let Some(token) = cookies::token_from_headers(&headers) {
        db::sessions::delete_session(&state.db, &session::hash_token(&token)).await?;
    }

    let cookie = cookies::clear_session_cookie(state.config.cookie_secure);
    Ok(([(header::SET_COOKIE, cookie)], ok(())))
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<impl IntoResponse> {
    let brand = db::found(db::brands::get_brand(&state.db, user.brand_id()).await?, "Brand")?;
    Ok(ok(MePayload {
        profile: user.profile,
        brand,
    }))
}

/// POST /api/auth/password
///
/// Rotates the hash and revokes every other session of the profile.
pub async fn change_password(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(req): JsonBody<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    password::check_password_strength(&req.new_password)?;

    let matches =
        password::verify_password_async(req.current_password, user.profile.password_hash.clone()).await?;
    if !matches {
        return Err(ApiError::BadRequest("Current password is incorrect".to_string()));
    }

    let hash = password::hash_password_async(req.new_password).await?;
    db::profiles::update_password_hash(&state.db, &user.profile.id, &hash).await?;
    let revoked = db::sessions::delete_other_sessions(&state.db, &user.profile.id, &user.token_hash).await?;
    info!("Password changed for {}; revoked {} other sessions", user.profile.email, revoked);

    Ok(ok(()))
}
