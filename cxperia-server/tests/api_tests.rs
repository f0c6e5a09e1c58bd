//! Integration tests for the brand dashboard API
//!
//! Tests cover:
//! - Product CRUD with paging, search and validation
//! - Experience creation, QR issuance and full view
//! - Instructions, ingredients and feature toggles
//! - Tutorials, uploads, feedback listing and analytics
//! - Account deletion

#[allow(dead_code)]
mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestServer;

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let server = TestServer::start().await;
    let (status, body) = server.call("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "cxperia-server");
    assert!(body["version"].is_string());
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_product_crud() {
    let server = TestServer::start().await;
    let token = server.signup("Glow Co", "owner@glow.co").await;

    let (status, created) = server
        .call(
            "POST",
            "/api/products",
            Some(&token),
            Some(json!({
                "name": "  Vitamin C Serum ",
                "price": 29.0,
                "currency": "eur",
                "image_urls": ["https://cdn.glow.co/serum.png"],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);
    assert_eq!(created["data"]["name"], "Vitamin C Serum");
    assert_eq!(created["data"]["currency"], "EUR");
    assert_eq!(created["data"]["image_urls"][0], "https://cdn.glow.co/serum.png");
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, updated) = server
        .call(
            "PATCH",
            &format!("/api/products/{}", id),
            Some(&token),
            Some(json!({ "description": "Brightening", "price": 31.5 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["description"], "Brightening");
    assert_eq!(updated["data"]["price"], 31.5);
    assert_eq!(updated["data"]["name"], "Vitamin C Serum");

    let (status, fetched) = server.call("GET", &format!("/api/products/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["price"], 31.5);

    let (status, _) = server.call("DELETE", &format!("/api/products/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server.call("GET", &format!("/api/products/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_product_validation() {
    let server = TestServer::start().await;
    let token = server.signup("Glow Co", "owner@glow.co").await;

    let cases = [
        json!({ "name": "   " }),
        json!({ "name": "Serum", "price": -1.0 }),
        json!({ "name": "Serum", "usage_duration_days": -30 }),
        json!({ "name": "Serum", "image_urls": ["file:///etc/passwd"] }),
        json!({ "price": 10.0 }),
    ];
    for case in cases {
        let (status, body) = server.call("POST", "/api/products", Some(&token), Some(case.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {}", case);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_product_list_pages_and_searches() {
    let server = TestServer::start().await;
    let token = server.signup("Glow Co", "owner@glow.co").await;

    for i in 0..25 {
        let name = if i % 5 == 0 { format!("Night Cream {}", i) } else { format!("Serum {}", i) };
        let (status, _) = server.call("POST", "/api/products", Some(&token), Some(json!({ "name": name }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, first) = server.call("GET", "/api/products", Some(&token), None).await;
    assert_eq!(first["data"]["total"], 25);
    assert_eq!(first["data"]["total_pages"], 2);
    assert_eq!(first["data"]["items"].as_array().unwrap().len(), 20);

    let (_, second) = server.call("GET", "/api/products?page=2", Some(&token), None).await;
    assert_eq!(second["data"]["page"], 2);
    assert_eq!(second["data"]["items"].as_array().unwrap().len(), 5);

    let (_, search) = server.call("GET", "/api/products?search=night", Some(&token), None).await;
    assert_eq!(search["data"]["total"], 5);
}

#[tokio::test]
async fn test_bad_query_string_uses_error_envelope() {
    let server = TestServer::start().await;
    let token = server.signup("Glow Co", "owner@glow.co").await;

    for uri in ["/api/products?page=abc", "/api/products?page=2&search=x&page=3", "/api/feedback?page=1.5"] {
        let (status, body) = server.call("GET", uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["success"], false, "{}", uri);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid query string"), "{}", uri);
    }
}

#[tokio::test]
async fn test_products_are_scoped_to_brand() {
    let server = TestServer::start().await;
    let alice = server.signup("Alice Beauty", "alice@a.co").await;
    let bob = server.signup("Bob Beauty", "bob@b.co").await;

    let (_, product) = server
        .call("POST", "/api/products", Some(&alice), Some(json!({ "name": "Balm" })))
        .await;
    let uri = format!("/api/products/{}", product["data"]["id"].as_str().unwrap());

    let (status, _) = server.call("GET", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = server.call("PATCH", &uri, Some(&bob), Some(json!({ "name": "Mine" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = server.call("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = server.call("GET", "/api/products", Some(&bob), None).await;
    assert_eq!(list["data"]["total"], 0);

    let (status, _) = server.call("GET", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Experiences and QR codes
// =============================================================================

#[tokio::test]
async fn test_new_experience_is_unpublished() {
    let server = TestServer::start().await;
    let token = server.signup("Glow Co", "owner@glow.co").await;
    let id = server.create_experience(&token, "Serum").await;

    let (status, body) = server.call("GET", &format!("/api/experiences/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_published"], false);
    assert!(body["data"]["slug"].is_null());
    assert!(body["data"]["qr_code_url"].is_null());
    assert_eq!(body["data"]["theme"], "light");
    assert_eq!(body["data"]["scan_count"], 0);
}

#[tokio::test]
async fn test_experience_for_foreign_product_is_not_found() {
    let server = TestServer::start().await;
    let alice = server.signup("Alice Beauty", "alice@a.co").await;
    let bob = server.signup("Bob Beauty", "bob@b.co").await;

    let (_, product) = server
        .call("POST", "/api/products", Some(&alice), Some(json!({ "name": "Balm" })))
        .await;

    let (status, _) = server
        .call(
            "POST",
            "/api/experiences",
            Some(&bob),
            Some(json!({ "product_id": product["data"]["id"] })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_qr_code_is_idempotent() {
    let server = TestServer::start().await;
    let token = server.signup("Glow Co", "owner@glow.co").await;
    let id = server.create_experience(&token, "Vitamin C Serum").await;
    let uri = format!("/api/experiences/{}/qr", id);

    let (status, first) = server.call("POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let qr = first["data"]["qr_code_url"].as_str().unwrap();
    assert!(qr.starts_with("data:image/svg+xml;base64,"));
    let slug = first["data"]["slug"].as_str().unwrap();
    assert!(slug.starts_with("vitamin-c-serum-"));
    assert_eq!(
        first["data"]["public_url"],
        format!("http://localhost:3000/experience/{}", slug)
    );

    let (status, second) = server.call("POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"], first["data"]);

    let (_, experience) = server.call("GET", &format!("/api/experiences/{}", id), Some(&token), None).await;
    assert_eq!(experience["data"]["is_published"], true);
    assert_eq!(experience["data"]["slug"], slug);
}

#[tokio::test]
async fn test_experience_update_and_full_view() {
    let server = TestServer::start().await;
    let token = server.signup("Glow Co", "owner@glow.co").await;
    let id = server.create_experience(&token, "Serum").await;

    let (status, updated) = server
        .call(
            "PATCH",
            &format!("/api/experiences/{}", id),
            Some(&token),
            Some(json!({
                "theme": "dark",
                "primary_color": "#FF00AA",
                "support_email": "Help@Glow.co",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["theme"], "dark");
    assert_eq!(updated["data"]["primary_color"], "#ff00aa");
    assert_eq!(updated["data"]["support_email"], "help@glow.co");

    let (status, _) = server
        .call(
            "PATCH",
            &format!("/api/experiences/{}", id),
            Some(&token),
            Some(json!({ "primary_color": "pink" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, full) = server
        .call("GET", &format!("/api/experiences/{}/full", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(full["data"]["id"], id.as_str());
    assert_eq!(full["data"]["product"]["name"], "Serum");
    assert_eq!(full["data"]["instructions"], json!([]));
    assert_eq!(full["data"]["features"].as_array().unwrap().len(), 6);
}

// =============================================================================
// Content
// =============================================================================

#[tokio::test]
async fn test_instructions_replace_and_renumber() {
    let server = TestServer::start().await;
    let token = server.signup("Glow Co", "owner@glow.co").await;
    let id = server.create_experience(&token, "Serum").await;
    let uri = format!("/api/experiences/{}/instructions", id);

    let (status, body) = server
        .call(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "instructions": [
                { "title": "Cleanse" },
                { "title": "Apply", "description": "Two drops" },
                { "title": "Moisturize" },
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (status, _) = server
        .call(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "instructions": [{ "title": "Apply" }, { "title": "Rinse" }] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = server.call("GET", &uri, Some(&token), None).await;
    let steps = listed["data"].as_array().unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["step_number"], 1);
    assert_eq!(steps[0]["title"], "Apply");
    assert_eq!(steps[1]["step_number"], 2);
    assert_eq!(steps[1]["title"], "Rinse");

    let (status, _) = server
        .call("PUT", &uri, Some(&token), Some(json!({ "instructions": [{ "title": " " }] })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, unchanged) = server.call("GET", &uri, Some(&token), None).await;
    assert_eq!(unchanged["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_features_defaults_and_replace() {
    let server = TestServer::start().await;
    let token = server.signup("Glow Co", "owner@glow.co").await;
    let id = server.create_experience(&token, "Serum").await;
    let uri = format!("/api/experiences/{}/features", id);

    let (_, defaults) = server.call("GET", &uri, Some(&token), None).await;
    let enabled: Vec<_> = defaults["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|f| f["enabled"] == true)
        .map(|f| f["feature_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(enabled, vec!["product_details"]);

    let (status, body) = server
        .call("PUT", &uri, Some(&token), Some(json!({ "enabled": ["ingredients", "feedback"] })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let flags = body["data"].as_array().unwrap();
    let flag = |name: &str| flags.iter().find(|f| f["feature_name"] == name).unwrap()["enabled"].clone();
    assert_eq!(flag("ingredients"), true);
    assert_eq!(flag("feedback"), true);
    assert_eq!(flag("product_details"), false);

    let (status, body) = server
        .call("PUT", &uri, Some(&token), Some(json!({ "enabled": ["reviews"] })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("reviews"));
}

#[tokio::test]
async fn test_ingredient_crud() {
    let server = TestServer::start().await;
    let token = server.signup("Glow Co", "owner@glow.co").await;
    let id = server.create_experience(&token, "Serum").await;
    let uri = format!("/api/experiences/{}/ingredients", id);

    let (status, water) = server.call("POST", &uri, Some(&token), Some(json!({ "name": "Aqua" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(water["data"]["position"], 0);

    let (_, nut) = server
        .call("POST", &uri, Some(&token), Some(json!({ "name": "Almond oil", "is_allergen": true })))
        .await;
    assert_eq!(nut["data"]["position"], 1);
    assert_eq!(nut["data"]["is_allergen"], true);

    let nut_uri = format!("/api/ingredients/{}", nut["data"]["id"].as_str().unwrap());
    let (status, patched) = server
        .call("PATCH", &nut_uri, Some(&token), Some(json!({ "description": "Sweet almond" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["data"]["description"], "Sweet almond");

    let (status, _) = server.call("DELETE", &nut_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = server.call("GET", &uri, Some(&token), None).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_deleting_foreign_ingredient_is_not_found() {
    let server = TestServer::start().await;
    let alice = server.signup("Alice Beauty", "alice@a.co").await;
    let bob = server.signup("Bob Beauty", "bob@b.co").await;
    let id = server.create_experience(&alice, "Serum").await;

    let (_, ingredient) = server
        .call(
            "POST",
            &format!("/api/experiences/{}/ingredients", id),
            Some(&alice),
            Some(json!({ "name": "Aqua" })),
        )
        .await;
    let uri = format!("/api/ingredients/{}", ingredient["data"]["id"].as_str().unwrap());

    let (status, body) = server.call("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ingredients")
        .fetch_one(&server.pool)
        .await
        .unwrap();
    assert_eq!(remaining, 1);

    // Bob cannot read Alice's experience content either
    let (status, _) = server
        .call("GET", &format!("/api/experiences/{}/ingredients", id), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Tutorials and uploads
// =============================================================================

#[tokio::test]
async fn test_tutorial_crud_and_experience_link() {
    let server = TestServer::start().await;
    let alice = server.signup("Alice Beauty", "alice@a.co").await;
    let bob = server.signup("Bob Beauty", "bob@b.co").await;
    let alice_exp = server.create_experience(&alice, "Serum").await;

    let (status, tutorial) = server
        .call(
            "POST",
            "/api/tutorials",
            Some(&alice),
            Some(json!({
                "title": "How to layer",
                "experience_id": alice_exp,
                "video_url": "https://video.example.com/layer.mp4",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tutorial["data"]["experience_id"], alice_exp.as_str());
    assert_eq!(tutorial["data"]["is_published"], false);

    // Linking to another brand's experience is rejected
    let (status, _) = server
        .call(
            "POST",
            "/api/tutorials",
            Some(&bob),
            Some(json!({ "title": "Sneaky", "experience_id": alice_exp })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/tutorials/{}", tutorial["data"]["id"].as_str().unwrap());
    let (status, patched) = server
        .call("PATCH", &uri, Some(&alice), Some(json!({ "is_published": true, "experience_id": "" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["data"]["is_published"], true);
    assert!(patched["data"]["experience_id"].is_null());

    let (_, listed) = server.call("GET", "/api/tutorials", Some(&alice), None).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    let (status, _) = server.call("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = server.call("DELETE", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_upload_metadata() {
    let server = TestServer::start().await;
    let token = server.signup("Glow Co", "owner@glow.co").await;

    let (status, _) = server
        .call("POST", "/api/uploads", Some(&token), Some(json!({ "url": "ftp://files.example.com/a.png" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .call(
            "POST",
            "/api/uploads",
            Some(&token),
            Some(json!({ "url": "https://cdn.example.com/a.mp3", "resource_type": "audio" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, image) = server
        .call(
            "POST",
            "/api/uploads",
            Some(&token),
            Some(json!({ "url": "https://cdn.example.com/a.png", "bytes": 2048, "format": "png" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(image["data"]["resource_type"], "image");

    let (status, _) = server
        .call(
            "POST",
            "/api/uploads",
            Some(&token),
            Some(json!({ "url": "https://cdn.example.com/b.mp4", "resource_type": "video" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, videos) = server.call("GET", "/api/uploads?resource_type=video", Some(&token), None).await;
    assert_eq!(videos["data"].as_array().unwrap().len(), 1);
    let (_, all) = server.call("GET", "/api/uploads", Some(&token), None).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 2);

    let uri = format!("/api/uploads/{}", image["data"]["id"].as_str().unwrap());
    let (status, _) = server.call("DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server.call("DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Feedback, analytics, platform feedback
// =============================================================================

#[tokio::test]
async fn test_feedback_listing_and_analytics() {
    let server = TestServer::start().await;
    let token = server.signup("Glow Co", "owner@glow.co").await;
    let (id, slug) = server.publish_experience(&token, "Serum").await;

    for rating in [5, 4, 3] {
        let (status, _) = server
            .call(
                "POST",
                &format!("/api/public/experiences/{}/feedback", slug),
                None,
                Some(json!({ "rating": rating, "comment": "nice" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, _) = server
        .call(
            "POST",
            &format!("/api/public/experiences/{}/scan", slug),
            None,
            Some(json!({ "visitor_id": "v1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, feedback) = server
        .call("GET", &format!("/api/feedback?experience_id={}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feedback["data"]["total"], 3);

    let (status, overview) = server.call("GET", "/api/analytics/overview", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["data"]["totals"]["experiences"], 1);
    assert_eq!(overview["data"]["totals"]["published_experiences"], 1);
    assert_eq!(overview["data"]["totals"]["scans"], 1);
    assert_eq!(overview["data"]["totals"]["feedback"], 3);
    assert_eq!(overview["data"]["totals"]["average_rating"], 4.0);
    assert_eq!(overview["data"]["experiences"][0]["scan_count"], 1);
}

#[tokio::test]
async fn test_platform_feedback_submission() {
    let server = TestServer::start().await;
    let token = server.signup("Glow Co", "owner@glow.co").await;

    let (status, _) = server
        .call("POST", "/api/platform-feedback", Some(&token), Some(json!({ "message": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server
        .call(
            "POST",
            "/api/platform-feedback",
            Some(&token),
            Some(json!({ "category": "bug", "message": "QR preview is blurry" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["category"], "bug");
    assert!(body["data"]["profile_id"].is_string());
}

// =============================================================================
// Brand and account deletion
// =============================================================================

#[tokio::test]
async fn test_brand_update() {
    let server = TestServer::start().await;
    let token = server.signup("Glow Co", "owner@glow.co").await;

    let (status, body) = server
        .call(
            "PATCH",
            "/api/brand",
            Some(&token),
            Some(json!({ "name": "Glow & Co", "website": "https://glow.co", "primary_color": "#123456" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Glow & Co");
    assert_eq!(body["data"]["website"], "https://glow.co");

    let (status, _) = server.call("PATCH", "/api/brand", Some(&token), Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, brand) = server.call("GET", "/api/brand", Some(&token), None).await;
    assert_eq!(brand["data"]["name"], "Glow & Co");
    assert_eq!(brand["data"]["plan"], "free");
}

#[tokio::test]
async fn test_account_deletion_removes_all_brand_rows() {
    let server = TestServer::start().await;
    let token = server.signup("Glow Co", "owner@glow.co").await;
    let other = server.signup("Other Co", "other@o.co").await;
    let (id, slug) = server.publish_experience(&token, "Serum").await;
    server.publish_experience(&other, "Balm").await;

    let (_, me) = server.call("GET", "/api/auth/me", Some(&token), None).await;
    let brand_id = me["data"]["brand"]["id"].as_str().unwrap().to_string();

    server
        .call(
            "PUT",
            &format!("/api/experiences/{}/instructions", id),
            Some(&token),
            Some(json!({ "instructions": [{ "title": "Apply" }] })),
        )
        .await;
    server
        .call(
            "POST",
            &format!("/api/experiences/{}/ingredients", id),
            Some(&token),
            Some(json!({ "name": "Aqua" })),
        )
        .await;
    server
        .call("PUT", &format!("/api/experiences/{}/features", id), Some(&token), Some(json!({ "enabled": ["feedback"] })))
        .await;
    server
        .call("POST", "/api/tutorials", Some(&token), Some(json!({ "title": "Intro" })))
        .await;
    server
        .call("POST", "/api/uploads", Some(&token), Some(json!({ "url": "https://cdn.example.com/a.png" })))
        .await;
    server
        .call("POST", "/api/platform-feedback", Some(&token), Some(json!({ "message": "hi" })))
        .await;
    server
        .call(
            "POST",
            &format!("/api/public/experiences/{}/feedback", slug),
            None,
            Some(json!({ "rating": 5 })),
        )
        .await;
    server
        .call("POST", &format!("/api/public/experiences/{}/scan", slug), None, Some(json!({})))
        .await;

    let (status, body) = server.call("DELETE", "/api/brand", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["rows_removed"].as_u64().unwrap() >= 10);

    for table in [
        "profiles",
        "products",
        "experiences",
        "ingredients",
        "tutorials",
        "customer_feedback",
        "scan_events",
        "platform_feedback",
        "uploads",
    ] {
        assert_eq!(server.count_for_brand(table, &brand_id).await, 0, "rows left in {}", table);
    }
    let brands: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM brands WHERE id = ?")
        .bind(&brand_id)
        .fetch_one(&server.pool)
        .await
        .unwrap();
    assert_eq!(brands, 0);
    for table in ["digital_instructions", "experience_features"] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE experience_id = ?", table))
            .bind(&id)
            .fetch_one(&server.pool)
            .await
            .unwrap();
        assert_eq!(count, 0, "rows left in {}", table);
    }

    // The session went with the profile
    let (status, _) = server.call("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The public page is gone
    let (status, _) = server
        .call("GET", &format!("/api/public/experiences/{}", slug), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The other brand is untouched
    let (_, products) = server.call("GET", "/api/products", Some(&other), None).await;
    assert_eq!(products["data"]["total"], 1);
}
