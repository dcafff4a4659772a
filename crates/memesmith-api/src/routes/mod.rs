//! Route table.
//!
//! | method | path | handler |
//! |--------|------|---------|
//! | GET | `/health` | [`health::health`] |
//! | GET | `/api/templates` | [`templates::list_templates`] |
//! | GET | `/api/templates/{id}` | [`templates::get_template`] |
//! | POST | `/api/process-image` | [`images::process_image`] |
//! | POST | `/api/render` | [`images::render`] |
//! | POST | `/api/create-checkout` | [`billing::create_checkout`] |
//! | POST | `/api/stripe-webhook` | [`billing::stripe_webhook`] |
//! | GET, PATCH | `/api/profile` | [`profile`] |
//! | GET, POST | `/api/memes` | [`memes`] |
//! | GET | `/api/memes/mine` | [`memes::list_mine`] |
//! | GET, DELETE | `/api/memes/{id}` | [`memes`] |

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use memesmith_auth::{AuthConfig, AuthLayer, SupabaseJwtValidator};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod billing;
pub mod health;
pub mod images;
pub mod memes;
pub mod profile;
pub mod templates;

/// Build the application router.
///
/// Tokens are checked on every route: a missing token continues anonymously,
/// an invalid one is rejected. Handlers that need a user take
/// [`memesmith_auth::AuthenticatedUser`], which answers 401 when there is none.
pub fn router(state: AppState) -> Router {
    let server = &state.config.server;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(server.cors_max_age_secs));

    let auth = AuthLayer::optional(
        Arc::new(SupabaseJwtValidator::new()),
        AuthConfig::from(&state.config.auth),
    );
    let body_limit = DefaultBodyLimit::max(server.max_upload_bytes);

    let api = Router::new()
        .route("/templates", get(templates::list_templates))
        .route("/templates/{id}", get(templates::get_template))
        .route("/process-image", post(images::process_image))
        .route("/render", post(images::render))
        .route("/create-checkout", post(billing::create_checkout))
        .route("/stripe-webhook", post(billing::stripe_webhook))
        .route(
            "/profile",
            get(profile::get_profile).patch(profile::update_profile),
        )
        .route("/memes", get(memes::list_public).post(memes::create_meme))
        .route("/memes/mine", get(memes::list_mine))
        .route("/memes/{id}", get(memes::get_meme).delete(memes::delete_meme))
        .layer(auth);

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
