//! Common test utilities and harness for MemeSmith API integration tests.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use memesmith_api::{router, AppState};
use memesmith_core::{MemeTemplate, MemesmithConfig, TemplateCatalog, UserId, UserProfile};
use memesmith_render::{Canvas, Rgba};
use memesmith_store::{MemoryStore, Store, UserStore};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

/// Secret test tokens are signed with.
pub const JWT_SECRET: &str = "test-jwt-secret-with-enough-entropy";

/// Stripe endpoint secret for signed webhook deliveries.
pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Multipart boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "memesmith-test-boundary";

/// A router over an in-memory store and a temporary templates directory.
pub struct TestHarness {
    /// Backing store, for seeding and inspecting rows
    pub store: Arc<MemoryStore>,
    /// Application state the router was built from
    pub state: AppState,
    _templates_dir: TempDir,
}

impl TestHarness {
    /// Harness with default limits.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Harness with configuration tweaks applied before the router is built.
    pub fn with_config(tweak: impl FnOnce(&mut MemesmithConfig)) -> Self {
        Self::with_catalog(test_catalog(), tweak)
    }

    /// Harness over a custom template catalog.
    pub fn with_catalog(
        catalog: TemplateCatalog,
        tweak: impl FnOnce(&mut MemesmithConfig),
    ) -> Self {
        let templates_dir = TempDir::new().unwrap();
        std::fs::write(templates_dir.path().join("plain.jpg"), png(320, 240)).unwrap();
        std::fs::write(templates_dir.path().join("premium.jpg"), png(240, 320)).unwrap();

        let mut config = MemesmithConfig::default();
        config.auth.enabled = true;
        config.auth.jwt_secret = JWT_SECRET.to_string();
        config.stripe.webhook_secret = WEBHOOK_SECRET.to_string();
        config.render.templates_dir = templates_dir.path().to_path_buf();
        tweak(&mut config);

        let store = Arc::new(MemoryStore::new());
        let dyn_store: Arc<dyn Store> = store.clone();
        let state = AppState::new(config, catalog, dyn_store).unwrap();

        Self {
            store,
            state,
            _templates_dir: templates_dir,
        }
    }

    /// Fresh router over the shared state.
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Send one request and collect the response.
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let resp = self.router().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Seed a profile.
    pub async fn create_user(&self, id: &str, is_pro: bool, credits: u32) -> UserProfile {
        let uid = UserId::new(id);
        self.store
            .create_user(UserProfile::new(uid.clone(), None))
            .await
            .unwrap();
        if is_pro {
            self.store.set_pro(&uid, true).await.unwrap();
        }
        if credits > 0 {
            self.store.add_credits(&uid, credits).await.unwrap();
        }
        self.store.get_user(&uid).await.unwrap()
    }

    /// Read a profile back.
    pub async fn user(&self, id: &str) -> UserProfile {
        self.store.get_user(&UserId::new(id)).await.unwrap()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// A collected response.
pub struct TestResponse {
    /// Status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Full body
    pub body: Bytes,
}

impl TestResponse {
    /// Body parsed as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    /// The `error` message of a JSON error body.
    pub fn error(&self) -> String {
        self.json()["error"].as_str().unwrap().to_string()
    }

    /// A header as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Dimensions of an image body.
    pub fn image_size(&self) -> (u32, u32) {
        let canvas = Canvas::from_image_bytes(&self.body).unwrap();
        (canvas.width(), canvas.height())
    }
}

/// Two small templates: `plain` (free) and `premium` (pro only).
pub fn test_catalog() -> TemplateCatalog {
    TemplateCatalog::new(vec![
        MemeTemplate::with_default_anchors("plain", "Plain", 320, 240),
        MemeTemplate::with_default_anchors("premium", "Premium", 240, 320).pro(),
    ])
    .unwrap()
}

/// A solid-colour PNG.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    Canvas::filled(width, height, Rgba::rgb(40, 80, 160))
        .unwrap()
        .encode_png()
        .unwrap()
}

/// A valid Supabase-style access token for `user_id`.
pub fn token_for(user_id: &str) -> String {
    let claims = json!({
        "sub": user_id,
        "email": format!("{user_id}@example.com"),
        "aud": "authenticated",
        "role": "authenticated",
        "exp": chrono::Utc::now().timestamp() + 3600,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

/// `Authorization` header value for `user_id`.
pub fn bearer(user_id: &str) -> String {
    format!("Bearer {}", token_for(user_id))
}

/// A GET request, optionally signed in.
pub fn get(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(user) = user {
        builder = builder.header("authorization", bearer(user));
    }
    builder.body(Body::empty()).unwrap()
}

/// A request with a JSON body, optionally signed in.
pub fn json_request(method: &str, uri: &str, user: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("authorization", bearer(user));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// A `multipart/form-data` body with optional `image` and `settings` parts.
pub fn multipart_body(image: Option<&[u8]>, settings: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(image) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"upload.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(image);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(settings) = settings {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"settings\"\r\n\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(settings.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// `POST /api/process-image` with a multipart body.
pub fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/process-image")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// `POST /api/stripe-webhook` signed with [`WEBHOOK_SECRET`].
pub fn webhook_request(event: &Value) -> Request<Body> {
    let payload = event.to_string();
    let header = memesmith_billing::sign_payload(
        payload.as_bytes(),
        WEBHOOK_SECRET,
        memesmith_billing::webhook::unix_now(),
    )
    .unwrap();
    Request::builder()
        .method("POST")
        .uri("/api/stripe-webhook")
        .header("content-type", "application/json")
        .header("stripe-signature", header)
        .body(Body::from(payload))
        .unwrap()
}

/// A `checkout.session.completed` event for `user_id`.
pub fn checkout_completed(user_id: Option<&str>, metadata: Value) -> Value {
    json!({
        "id": "evt_test_1",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_test_1",
                "object": "checkout.session",
                "client_reference_id": user_id,
                "payment_status": "paid",
                "metadata": metadata,
            }
        }
    })
}
