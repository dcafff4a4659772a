//! Saved meme and gallery routes.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};

use crate::common::{bearer, get, json_request, TestHarness};

fn new_meme(n: usize, public: bool) -> Value {
    json!({
        "templateId": "plain",
        "memeUrl": format!("https://cdn.example.com/{n}.png"),
        "topText": format!("top {n}"),
        "bottomText": "bottom",
        "isPublic": public,
    })
}

fn delete(uri: &str, user: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("authorization", bearer(user))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_create_meme_requires_sign_in() {
    let harness = TestHarness::new();
    let resp = harness
        .send(json_request("POST", "/api/memes", None, &new_meme(1, true)))
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_fetch_meme() {
    let harness = TestHarness::new();
    let resp = harness
        .send(json_request("POST", "/api/memes", Some("alice"), &new_meme(1, true)))
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    let created = resp.json();
    assert_eq!(created["user_id"], "alice");
    assert_eq!(created["template_id"], "plain");

    let id = created["id"].as_str().unwrap();
    let resp = harness.send(get(&format!("/api/memes/{id}"), None)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["top_text"], "top 1");
}

#[tokio::test]
async fn test_create_meme_validates_url() {
    let harness = TestHarness::new();
    let mut meme = new_meme(1, true);
    meme["memeUrl"] = json!("");
    let resp = harness
        .send(json_request("POST", "/api/memes", Some("alice"), &meme))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_meme_errors() {
    let harness = TestHarness::new();
    let resp = harness.send(get("/api/memes/not-a-uuid", None)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.error(), "meme not found: not-a-uuid");

    let resp = harness.send(delete("/api/memes/not-a-uuid", "alice")).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = harness
        .send(get("/api/memes/6f9619ff-8b86-4d01-b42d-00cf4fc964ff", None))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_mine_only_returns_own_memes() {
    let harness = TestHarness::new();
    for n in 0..2 {
        harness
            .send(json_request("POST", "/api/memes", Some("alice"), &new_meme(n, false)))
            .await;
    }
    harness
        .send(json_request("POST", "/api/memes", Some("bob"), &new_meme(9, true)))
        .await;

    let resp = harness.send(get("/api/memes/mine", Some("alice"))).await;
    assert_eq!(resp.status, StatusCode::OK);
    let json = resp.json();
    let memes = json.as_array().unwrap();
    assert_eq!(memes.len(), 2);
    assert!(memes.iter().all(|m| m["user_id"] == "alice"));

    let resp = harness.send(get("/api/memes/mine", None)).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_gallery_pages() {
    let harness = TestHarness::new();
    for n in 0..14 {
        harness
            .send(json_request("POST", "/api/memes", Some("alice"), &new_meme(n, true)))
            .await;
    }
    harness
        .send(json_request("POST", "/api/memes", Some("alice"), &new_meme(99, false)))
        .await;

    let first = harness.send(get("/api/memes", None)).await.json();
    assert_eq!(first["memes"].as_array().unwrap().len(), 12);
    assert_eq!(first["nextPage"], 1);
    assert_eq!(first["totalCount"], 14);

    let second = harness.send(get("/api/memes?page=1", None)).await.json();
    assert_eq!(second["memes"].as_array().unwrap().len(), 2);
    assert!(second["nextPage"].is_null());
}

#[tokio::test]
async fn test_delete_owner_only() {
    let harness = TestHarness::new();
    let created = harness
        .send(json_request("POST", "/api/memes", Some("alice"), &new_meme(1, true)))
        .await
        .json();
    let uri = format!("/api/memes/{}", created["id"].as_str().unwrap());

    let resp = harness.send(delete(&uri, "mallory")).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = harness.send(delete(&uri, "alice")).await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);

    let resp = harness.send(get(&uri, None)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}
