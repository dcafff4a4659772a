//! Health and template catalog routes.

use axum::http::StatusCode;

use crate::common::{get, TestHarness};

#[tokio::test]
async fn test_health() {
    let harness = TestHarness::new();
    let resp = harness.send(get("/health", None)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let json = resp.json();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["store"], "memory");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_list_all_templates_flags_pro() {
    let harness = TestHarness::new();
    let resp = harness.send(get("/api/templates", None)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let json = resp.json();
    let templates = json.as_array().unwrap();
    assert_eq!(templates.len(), 2);
    assert_eq!(templates[0]["id"], "plain");
    assert_eq!(templates[0]["pro_only"], false);
    assert_eq!(templates[1]["pro_only"], true);
    assert!(templates[0]["textPositions"]["top"]["x"].is_number());
}

#[tokio::test]
async fn test_available_templates_for_anonymous() {
    let harness = TestHarness::new();
    let resp = harness.send(get("/api/templates?available=true", None)).await;
    let json = resp.json();
    let ids: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["plain"]);
}

#[tokio::test]
async fn test_available_templates_for_pro_user() {
    let harness = TestHarness::new();
    harness.create_user("pro-user", true, 0).await;
    let resp = harness
        .send(get("/api/templates?available=true", Some("pro-user")))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json().as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_get_template() {
    let harness = TestHarness::new();
    let resp = harness.send(get("/api/templates/plain", None)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["name"], "Plain");

    let resp = harness.send(get("/api/templates/nope", None)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert!(resp.error().contains("nope"));
}

#[tokio::test]
async fn test_invalid_token_rejected_even_on_public_routes() {
    let harness = TestHarness::new();
    let req = axum::http::Request::builder()
        .uri("/api/templates")
        .header("authorization", "Bearer not-a-jwt")
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = harness.send(req).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert!(resp
        .header("www-authenticate")
        .unwrap()
        .contains("invalid_token"));
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin() {
    let harness = TestHarness::new();
    let req = axum::http::Request::builder()
        .method("OPTIONS")
        .uri("/api/render")
        .header("origin", "https://memesmith.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type,authorization")
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = harness.send(req).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("access-control-allow-origin"), Some("*"));
}
