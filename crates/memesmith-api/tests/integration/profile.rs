//! Profile routes.

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{get, json_request, TestHarness};

#[tokio::test]
async fn test_profile_requires_sign_in() {
    let harness = TestHarness::new();
    let resp = harness.send(get("/api/profile", None)).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_created_on_first_access() {
    let harness = TestHarness::new();
    let resp = harness.send(get("/api/profile", Some("alice"))).await;
    assert_eq!(resp.status, StatusCode::OK);
    let json = resp.json();
    assert_eq!(json["id"], "alice");
    assert_eq!(json["email"], "alice@example.com");
    assert_eq!(json["is_pro"], false);
    assert_eq!(json["credits"], 0);

    let resp = harness.send(get("/api/profile", Some("alice"))).await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_profile() {
    let harness = TestHarness::new();
    let body = json!({"username": "  memelord  ", "profile_pic_url": "https://img.example.com/a.png"});
    let resp = harness
        .send(json_request("PATCH", "/api/profile", Some("alice"), &body))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["username"], "memelord");
    assert_eq!(
        harness.user("alice").await.profile_pic_url.as_deref(),
        Some("https://img.example.com/a.png")
    );
}

#[tokio::test]
async fn test_update_profile_rejects_blank_username() {
    let harness = TestHarness::new();
    let body = json!({"username": "   "});
    let resp = harness
        .send(json_request("PATCH", "/api/profile", Some("alice"), &body))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_profile_cannot_grant_pro() {
    let harness = TestHarness::new();
    let body = json!({"is_pro": true, "credits": 999});
    let resp = harness
        .send(json_request("PATCH", "/api/profile", Some("alice"), &body))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let profile = harness.user("alice").await;
    assert!(!profile.is_pro);
    assert_eq!(profile.credits, 0);
}
