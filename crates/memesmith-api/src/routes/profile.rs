//! Profile routes.

use axum::extract::State;
use axum::Json;
use memesmith_auth::AuthenticatedUser;
use memesmith_core::{ProfileUpdate, UserProfile};
use memesmith_store::UserStore;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Longest accepted username.
pub const MAX_USERNAME_CHARS: usize = 32;

/// `GET /api/profile`
///
/// The first call creates the row from the token's identity.
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserProfile>> {
    let profile = state
        .store
        .get_or_create_user(&user.user_id, user.email)
        .await?;
    Ok(Json(profile))
}

/// `PATCH /api/profile`
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(mut update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>> {
    if let Some(username) = update.username.take() {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(ApiError::bad_request("username must not be empty"));
        }
        if username.chars().count() > MAX_USERNAME_CHARS {
            return Err(ApiError::bad_request(format!(
                "username must be at most {MAX_USERNAME_CHARS} characters"
            )));
        }
        update.username = Some(username);
    }

    state
        .store
        .get_or_create_user(&user.user_id, user.email)
        .await?;
    let profile = state.store.update_profile(&user.user_id, update).await?;
    tracing::info!(user = %user.user_id, "Profile updated");
    Ok(Json(profile))
}
