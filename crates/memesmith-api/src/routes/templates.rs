//! Template catalog routes.

use axum::extract::{Path, Query, State};
use axum::Json;
use memesmith_auth::MaybeUser;
use memesmith_core::MemeTemplate;
use memesmith_store::UserStore;
use serde::Deserialize;

use crate::error::Result;
use crate::state::AppState;

/// Query string of `GET /api/templates`.
#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    /// Only list templates the caller may render without paying.
    #[serde(default)]
    pub available: bool,
}

/// `GET /api/templates`
pub async fn list_templates(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<TemplateQuery>,
) -> Result<Json<Vec<MemeTemplate>>> {
    if !query.available {
        return Ok(Json(state.catalog.list().into_iter().cloned().collect()));
    }

    let is_pro = match &user {
        Some(user) => match state.store.get_user(&user.user_id).await {
            Ok(profile) => profile.is_pro,
            Err(e) if e.is_not_found() => false,
            Err(e) => return Err(e.into()),
        },
        None => false,
    };
    Ok(Json(
        state
            .catalog
            .available_to(is_pro)
            .into_iter()
            .cloned()
            .collect(),
    ))
}

/// `GET /api/templates/{id}`
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MemeTemplate>> {
    Ok(Json(state.catalog.get(&id)?.clone()))
}
