//! cxperia-server library
//!
//! JSON REST API for brand dashboards, the public experience viewer and the
//! operator admin panel.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::Router;
use cxperia_common::api::auth::SECRET_HEADER;
use cxperia_common::config::ServerConfig;
use sqlx::SqlitePool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod api;
pub mod auth;
pub mod cache;
pub mod db;
pub mod error;
pub mod mailer;
pub mod pagination;
pub mod qr;

pub use error::{ApiError, ApiResult};

use cache::{PublicCache, ScanDeduper};
use mailer::Mailer;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    pub config: Arc<ServerConfig>,
    /// Secret required by the public viewer routes (0 disables the check)
    pub shared_secret: i64,
    pub cache: PublicCache,
    pub scans: ScanDeduper,
    pub mailer: Mailer,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, config: ServerConfig, shared_secret: i64) -> Self {
        let cache = PublicCache::new(
            config.cache_max_entries,
            Duration::from_secs(config.cache_ttl_secs),
        );
        let scans = ScanDeduper::new(
            config.cache_max_entries,
            Duration::from_secs(config.scan_dedup_minutes.saturating_mul(60)),
        );
        let mailer = Mailer::new(config.email.clone());

        Self {
            db,
            config: Arc::new(config),
            shared_secret,
            cache,
            scans,
            mailer,
        }
    }
}

/// CORS policy: credentialed requests from the configured origins, or any
/// origin without credentials when none are configured
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim_end_matches('/')) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(SECRET_HEADER),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

/// Build application router
///
/// `/health` and `/api/auth/*` need no session; dashboard routes check the
/// session in their extractors; `/api/public/*` sits behind the shared-secret
/// middleware.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, patch, post};

    let auth = Router::new()
        .route("/api/auth/signup", post(api::auth::signup))
        .route("/api/auth/login", post(api::auth::login))
        .route("/api/auth/logout", post(api::auth::logout))
        .route("/api/auth/me", get(api::auth::me))
        .route("/api/auth/password", post(api::auth::change_password));

    let dashboard = Router::new()
        .route(
            "/api/brand",
            get(api::brand::get_brand)
                .patch(api::brand::update_brand)
                .delete(api::brand::delete_brand),
        )
        .route(
            "/api/products",
            get(api::products::list_products).post(api::products::create_product),
        )
        .route(
            "/api/products/:id",
            get(api::products::get_product)
                .patch(api::products::update_product)
                .delete(api::products::delete_product),
        )
        .route(
            "/api/experiences",
            get(api::experiences::list_experiences).post(api::experiences::create_experience),
        )
        .route(
            "/api/experiences/:id",
            get(api::experiences::get_experience)
                .patch(api::experiences::update_experience)
                .delete(api::experiences::delete_experience),
        )
        .route("/api/experiences/:id/full", get(api::experiences::get_experience_full))
        .route("/api/experiences/:id/qr", post(api::experiences::issue_qr_code))
        .route(
            "/api/experiences/:id/instructions",
            get(api::content::list_instructions).put(api::content::replace_instructions),
        )
        .route(
            "/api/experiences/:id/ingredients",
            get(api::content::list_ingredients).post(api::content::create_ingredient),
        )
        .route(
            "/api/ingredients/:id",
            patch(api::content::update_ingredient).delete(api::content::delete_ingredient),
        )
        .route(
            "/api/experiences/:id/features",
            get(api::content::list_features).put(api::content::replace_features),
        )
        .route(
            "/api/tutorials",
            get(api::tutorials::list_tutorials).post(api::tutorials::create_tutorial),
        )
        .route(
            "/api/tutorials/:id",
            patch(api::tutorials::update_tutorial).delete(api::tutorials::delete_tutorial),
        )
        .route("/api/feedback", get(api::feedback::list_feedback))
        .route("/api/analytics/overview", get(api::feedback::analytics_overview))
        .route("/api/platform-feedback", post(api::feedback::submit_platform_feedback))
        .route(
            "/api/uploads",
            get(api::uploads::list_uploads).post(api::uploads::register_upload),
        )
        .route("/api/uploads/:id", delete(api::uploads::delete_upload))
        .route("/api/cache/purge", post(api::cache::purge_cache));

    let admin = Router::new()
        .route("/api/admin/brands", get(api::admin::list_brands))
        .route(
            "/api/admin/brands/:id",
            get(api::admin::get_brand)
                .patch(api::admin::update_plan)
                .delete(api::admin::delete_brand),
        )
        .route("/api/admin/platform-feedback", get(api::admin::list_platform_feedback))
        .route("/api/admin/stats", get(api::admin::platform_stats));

    // Public viewer routes (shared secret, no session)
    let public = Router::new()
        .route("/api/public/experiences/:slug", get(api::public::get_experience))
        .route("/api/public/experiences/:slug/products", get(api::public::list_products))
        .route("/api/public/experiences/:slug/tutorials", get(api::public::list_tutorials))
        .route("/api/public/experiences/:slug/feedback", post(api::public::submit_feedback))
        .route("/api/public/experiences/:slug/scan", post(api::public::record_scan))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::public_secret_middleware,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(auth)
        .merge(dashboard)
        .merge(admin)
        .merge(public)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
