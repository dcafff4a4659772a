//! Liveness check.

use axum::extract::State;
use axum::Json;
use memesmith_store::Store;
use serde_json::{json, Value};

use crate::state::AppState;

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "store": state.store.name(),
        "templates": state.catalog.len(),
    }))
}
