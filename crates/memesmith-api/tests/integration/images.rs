//! Upload processing and template rendering.

use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use memesmith_core::{MemeTemplate, TemplateCatalog};
use serde_json::json;

use crate::common::{json_request, multipart_body, png, upload_request, TestHarness};

/// Serve a 64x48 PNG at `/base.png` after `delay`; returns the image URL.
async fn spawn_image_host(delay: Duration) -> String {
    let app = Router::new().route(
        "/base.png",
        get(move || async move {
            tokio::time::sleep(delay).await;
            png(64, 48)
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/base.png")
}

fn remote_harness(url: String) -> TestHarness {
    let mut template = MemeTemplate::with_default_anchors("remote", "Remote", 320, 240);
    template.url = url;
    let catalog = TemplateCatalog::new(vec![template]).unwrap();
    TestHarness::with_catalog(catalog, |c| c.render.fetch_timeout_secs = 1)
}

#[tokio::test]
async fn test_process_image_fits_and_returns_png() {
    let harness = TestHarness::new();
    let settings = r##"{"texts":[{"content":"HELLO","fontSize":40,"color":"#ffffff"},{"content":""}]}"##;
    let resp = harness
        .send(upload_request(multipart_body(Some(&png(2160, 1080)), Some(settings))))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("content-type"), Some("image/png"));
    assert_eq!(
        resp.header("content-disposition"),
        Some("attachment; filename=\"memesmith-processed.png\"")
    );
    assert_eq!(resp.image_size(), (1080, 540));
}

#[tokio::test]
async fn test_process_image_without_settings() {
    let harness = TestHarness::new();
    let resp = harness
        .send(upload_request(multipart_body(Some(&png(200, 300)), None)))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.image_size(), (200, 300));
}

#[tokio::test]
async fn test_process_image_requires_image() {
    let harness = TestHarness::new();
    let resp = harness
        .send(upload_request(multipart_body(None, Some(r#"{"texts":[]}"#))))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), "No image file provided");
}

#[tokio::test]
async fn test_process_image_rejects_bad_settings() {
    let harness = TestHarness::new();
    let resp = harness
        .send(upload_request(multipart_body(Some(&png(50, 50)), Some("{not json"))))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), "Invalid text overlay settings JSON");
}

#[tokio::test]
async fn test_process_image_rejects_non_image() {
    let harness = TestHarness::new();
    let resp = harness
        .send(upload_request(multipart_body(Some(b"definitely not an image"), None)))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.error().starts_with("Failed to decode image"));
}

#[tokio::test]
async fn test_process_image_payload_too_large() {
    let harness = TestHarness::with_config(|c| c.server.max_upload_bytes = 1024);
    let resp = harness
        .send(upload_request(multipart_body(Some(&vec![0u8; 8 * 1024]), None)))
        .await;
    assert_eq!(resp.status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_render_free_template_anonymously() {
    let harness = TestHarness::new();
    let body = json!({"templateId": "plain", "topText": "TOP", "bottomText": "BOTTOM"});
    let resp = harness
        .send(json_request("POST", "/api/render", None, &body))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("content-type"), Some("image/png"));
    assert_eq!(
        resp.header("content-disposition"),
        Some("attachment; filename=\"memesmith-plain.png\"")
    );
    assert_eq!(resp.image_size(), (320, 240));
    assert!(resp.header("x-credits-remaining").is_none());
}

#[tokio::test]
async fn test_render_unknown_template() {
    let harness = TestHarness::new();
    let body = json!({"templateId": "missing"});
    let resp = harness
        .send(json_request("POST", "/api/render", None, &body))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_render_unknown_effect() {
    let harness = TestHarness::new();
    let body = json!({"templateId": "plain", "effect": "sparkle"});
    let resp = harness
        .send(json_request("POST", "/api/render", None, &body))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.error().contains("sparkle"));
}

#[tokio::test]
async fn test_render_premium_requires_sign_in() {
    let harness = TestHarness::new();
    let body = json!({"templateId": "plain", "topText": "hi", "effect": "glow"});
    let resp = harness
        .send(json_request("POST", "/api/render", None, &body))
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_render_premium_denied_without_pro_or_credits() {
    let harness = TestHarness::new();
    harness.create_user("free-user", false, 0).await;
    let body = json!({"templateId": "premium", "topText": "hi"});
    let resp = harness
        .send(json_request("POST", "/api/render", Some("free-user"), &body))
        .await;
    assert_eq!(resp.status, StatusCode::PAYMENT_REQUIRED);
}

#[tokio::test]
async fn test_render_premium_for_pro_user() {
    let harness = TestHarness::new();
    harness.create_user("pro-user", true, 0).await;
    let body = json!({"templateId": "premium", "topText": "GOLD", "effect": "golden"});
    let resp = harness
        .send(json_request("POST", "/api/render", Some("pro-user"), &body))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.image_size(), (240, 320));
    assert!(resp.header("x-credits-remaining").is_none());
}

#[tokio::test]
async fn test_render_premium_spends_one_credit() {
    let harness = TestHarness::new();
    harness.create_user("credit-user", false, 2).await;
    let body = json!({"templateId": "plain", "topText": "GLOW", "effect": "glow"});

    let resp = harness
        .send(json_request("POST", "/api/render", Some("credit-user"), &body))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("x-credits-remaining"), Some("1"));
    assert_eq!(harness.user("credit-user").await.credits, 1);
}

#[tokio::test]
async fn test_render_free_request_keeps_credits() {
    let harness = TestHarness::new();
    harness.create_user("credit-user", false, 2).await;
    let body = json!({"templateId": "plain", "topText": "PLAIN"});
    let resp = harness
        .send(json_request("POST", "/api/render", Some("credit-user"), &body))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(harness.user("credit-user").await.credits, 2);
}

#[tokio::test]
async fn test_failed_render_keeps_credit() {
    let harness = TestHarness::with_config(|c| {
        c.render.templates_dir = std::path::PathBuf::from("/nonexistent/memesmith/templates");
    });
    harness.create_user("credit-user", false, 1).await;
    let body = json!({"templateId": "plain", "effect": "glow"});
    let resp = harness
        .send(json_request("POST", "/api/render", Some("credit-user"), &body))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(harness.user("credit-user").await.credits, 1);
}

#[tokio::test]
async fn test_render_remote_template() {
    let harness = remote_harness(spawn_image_host(Duration::ZERO).await);
    let body = json!({"templateId": "remote", "topText": "TOP"});
    let resp = harness
        .send(json_request("POST", "/api/render", None, &body))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.image_size(), (320, 240));
}

#[tokio::test]
async fn test_render_remote_template_times_out() {
    let harness = remote_harness(spawn_image_host(Duration::from_secs(5)).await);
    let body = json!({"templateId": "remote"});
    let resp = harness
        .send(json_request("POST", "/api/render", None, &body))
        .await;
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(resp.error().starts_with("Failed to fetch template image"));
}
