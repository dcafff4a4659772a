//! Saved meme routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use memesmith_auth::AuthenticatedUser;
use memesmith_core::{Meme, MemeId, MemePage, NewMeme};
use memesmith_store::MemeStore;
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Query string of `GET /api/memes`.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Zero-based gallery page.
    #[serde(default)]
    pub page: u32,
}

/// `GET /api/memes`
pub async fn list_public(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MemePage>> {
    Ok(Json(state.store.list_public(query.page).await?))
}

/// `GET /api/memes/mine`
pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Meme>>> {
    Ok(Json(state.store.list_user_memes(&user.user_id).await?))
}

/// `POST /api/memes`
pub async fn create_meme(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(meme): Json<NewMeme>,
) -> Result<(StatusCode, Json<Meme>)> {
    meme.validate()?;
    let meme = state.store.create_meme(&user.user_id, meme).await?;
    tracing::info!(meme = %meme.id, user = %user.user_id, public = meme.is_public, "Meme saved");
    Ok((StatusCode::CREATED, Json(meme)))
}

/// `GET /api/memes/{id}`
pub async fn get_meme(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Meme>> {
    let id = parse_id(&id)?;
    Ok(Json(state.store.get_meme(&id).await?))
}

/// `DELETE /api/memes/{id}`
pub async fn delete_meme(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id)?;
    state.store.delete_meme(&id, &user.user_id).await?;
    tracing::info!(meme = %id, user = %user.user_id, "Meme deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// A string that isn't a UUID can't name any meme.
fn parse_id(id: &str) -> Result<MemeId> {
    id.parse()
        .map_err(|_| ApiError::NotFound(format!("meme not found: {id}")))
}
