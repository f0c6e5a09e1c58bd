//! Test server wrapper for integration tests
//!
//! Builds the full router over a fresh SQLite database in a temp dir and
//! drives it with `oneshot`, no socket involved.

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use cxperia_common::api::auth::store_shared_secret;
use cxperia_common::config::ServerConfig;
use cxperia_common::db::{init_database, Role};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt;

use cxperia_server::{build_router, AppState};

pub const TEST_PASSWORD: &str = "correct-horse";

/// Router plus the pool behind it
pub struct TestServer {
    router: Router,
    pub pool: SqlitePool,
    _dir: TempDir,
}

/// Build a JSON request with an optional bearer token
pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

impl TestServer {
    /// Server with the public secret check disabled
    pub async fn start() -> Self {
        Self::with_config(ServerConfig::default(), 0).await
    }

    /// Server whose public routes require `secret`
    pub async fn with_secret(secret: i64) -> Self {
        Self::with_config(ServerConfig::default(), secret).await
    }

    pub async fn with_config(config: ServerConfig, secret: i64) -> Self {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("test.db")).await.unwrap();
        store_shared_secret(&pool, secret).await.unwrap();

        let state = AppState::new(pool.clone(), config, secret);
        Self {
            router: build_router(state),
            pool,
            _dir: dir,
        }
    }

    /// Send a request, returning status, headers and the parsed JSON body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, headers, body)
    }

    pub async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let (status, _, body) = self.send(json_request(method, uri, token, body)).await;
        (status, body)
    }

    /// Sign up a new brand, returning its session token
    pub async fn signup(&self, brand_name: &str, email: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/signup",
                None,
                Some(json!({
                    "brand_name": brand_name,
                    "email": email,
                    "password": TEST_PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Change the role of the account with `email`
    pub async fn set_role(&self, email: &str, role: Role) {
        sqlx::query("UPDATE profiles SET role = ? WHERE email = ?")
            .bind(role)
            .bind(email)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    /// Create a product and an experience for it, returning the experience id
    pub async fn create_experience(&self, token: &str, product_name: &str) -> String {
        let (status, product) = self
            .call("POST", "/api/products", Some(token), Some(json!({ "name": product_name })))
            .await;
        assert_eq!(status, StatusCode::CREATED, "product create failed: {}", product);

        let (status, experience) = self
            .call(
                "POST",
                "/api/experiences",
                Some(token),
                Some(json!({ "product_id": product["data"]["id"] })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "experience create failed: {}", experience);
        experience["data"]["id"].as_str().unwrap().to_string()
    }

    /// Create an experience and issue its QR code, returning (id, slug)
    pub async fn publish_experience(&self, token: &str, product_name: &str) -> (String, String) {
        let id = self.create_experience(token, product_name).await;
        let (status, qr) = self
            .call("POST", &format!("/api/experiences/{}/qr", id), Some(token), None)
            .await;
        assert_eq!(status, StatusCode::OK, "qr failed: {}", qr);
        (id, qr["data"]["slug"].as_str().unwrap().to_string())
    }

    /// Row count of `table` for `brand_id`
    pub async fn count_for_brand(&self, table: &str, brand_id: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE brand_id = ?", table))
            .bind(brand_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}
