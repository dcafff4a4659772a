//! Checkout and Stripe webhook routes.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use crate::common::{checkout_completed, json_request, webhook_request, TestHarness};

#[tokio::test]
async fn test_checkout_requires_sign_in() {
    let harness = TestHarness::new();
    let body = json!({"returnUrl": "https://memesmith.com"});
    let resp = harness
        .send(json_request("POST", "/api/create-checkout", None, &body))
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_checkout_requires_return_url() {
    let harness = TestHarness::new();
    let body = json!({"returnUrl": ""});
    let resp = harness
        .send(json_request("POST", "/api/create-checkout", Some("buyer"), &body))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.error().contains("returnUrl"));
}

#[tokio::test]
async fn test_checkout_rejects_unknown_product() {
    let harness = TestHarness::new();
    let body = json!({"returnUrl": "https://memesmith.com", "product": "lifetime"});
    let resp = harness
        .send(json_request("POST", "/api/create-checkout", Some("buyer"), &body))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_without_stripe_key_is_server_error() {
    let harness = TestHarness::new();
    let body = json!({"returnUrl": "https://memesmith.com"});
    let resp = harness
        .send(json_request("POST", "/api/create-checkout", Some("buyer"), &body))
        .await;
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.error(), "Stripe is not configured");
}

#[tokio::test]
async fn test_webhook_upgrades_user() {
    let harness = TestHarness::new();
    harness.create_user("buyer", false, 0).await;

    let event = checkout_completed(Some("buyer"), json!({"userId": "buyer", "product": "pro"}));
    let resp = harness.send(webhook_request(&event)).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json(), json!({"received": true}));
    assert!(harness.user("buyer").await.is_pro);
}

#[tokio::test]
async fn test_webhook_creates_missing_profile() {
    let harness = TestHarness::new();
    let event = checkout_completed(None, json!({"userId": "newcomer"}));
    let resp = harness.send(webhook_request(&event)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(harness.user("newcomer").await.is_pro);
}

#[tokio::test]
async fn test_webhook_adds_credits() {
    let harness = TestHarness::new();
    harness.create_user("buyer", false, 3).await;
    let event = checkout_completed(
        Some("buyer"),
        json!({"userId": "buyer", "product": "credits", "credits": "10"}),
    );
    let resp = harness.send(webhook_request(&event)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let profile = harness.user("buyer").await;
    assert_eq!(profile.credits, 13);
    assert!(!profile.is_pro);
}

#[tokio::test]
async fn test_webhook_redelivery_adds_credits_once() {
    let harness = TestHarness::new();
    harness.create_user("buyer", false, 0).await;
    let event = checkout_completed(
        Some("buyer"),
        json!({"userId": "buyer", "product": "credits", "credits": "20"}),
    );

    for _ in 0..2 {
        let resp = harness.send(webhook_request(&event)).await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.json(), json!({"received": true}));
    }
    assert_eq!(harness.user("buyer").await.credits, 20);
}

#[tokio::test]
async fn test_webhook_without_user_reference() {
    let harness = TestHarness::new();
    let event = checkout_completed(None, json!({}));
    let resp = harness.send(webhook_request(&event)).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), "No userId found in session metadata");
}

#[tokio::test]
async fn test_webhook_ignores_other_events() {
    let harness = TestHarness::new();
    let event = json!({"id": "evt_2", "type": "customer.created", "data": {"object": {}}});
    let resp = harness.send(webhook_request(&event)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["received"], true);
}

#[tokio::test]
async fn test_webhook_missing_signature() {
    let harness = TestHarness::new();
    let req = Request::builder()
        .method("POST")
        .uri("/api/stripe-webhook")
        .body(Body::from(checkout_completed(Some("buyer"), json!({})).to_string()))
        .unwrap();
    let resp = harness.send(req).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp
        .error()
        .starts_with("Webhook signature verification failed"));
}

#[tokio::test]
async fn test_webhook_bad_signature() {
    let harness = TestHarness::new();
    harness.create_user("buyer", false, 0).await;
    let req = Request::builder()
        .method("POST")
        .uri("/api/stripe-webhook")
        .header("stripe-signature", format!("t=1700000000,v1={}", "ab".repeat(32)))
        .body(Body::from(checkout_completed(Some("buyer"), json!({})).to_string()))
        .unwrap();
    let resp = harness.send(req).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp
        .error()
        .starts_with("Webhook signature verification failed"));
    assert!(!harness.user("buyer").await.is_pro);
}

#[tokio::test]
async fn test_webhook_tampered_body() {
    let harness = TestHarness::new();
    let signed = webhook_request(&checkout_completed(Some("buyer"), json!({})));
    let (parts, _) = signed.into_parts();
    let tampered = checkout_completed(Some("attacker"), json!({})).to_string();
    let resp = harness
        .send(Request::from_parts(parts, Body::from(tampered)))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}
