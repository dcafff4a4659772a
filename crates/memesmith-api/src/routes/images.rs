//! Compositing routes.

use axum::extract::{Multipart, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use memesmith_auth::MaybeUser;
use memesmith_core::{Effect, Entitlement, UserProfile};
use memesmith_render::{
    process_upload, render_template, OutputFormat, OverlaySettings, UploadOptions, Watermark,
};
use memesmith_store::UserStore;
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Remaining balance after a credit is spent on a render.
pub const CREDITS_REMAINING_HEADER: &str = "x-credits-remaining";

/// `POST /api/process-image`
///
/// Multipart fields: `image` (the file) and `settings` (overlay JSON).
pub async fn process_image(State(state): State<AppState>, mut multipart: Multipart) -> Result<Response> {
    let mut image: Option<Vec<u8>> = None;
    let mut settings: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("image") => image = Some(field.bytes().await?.to_vec()),
            Some("settings") => settings = Some(field.text().await?),
            other => tracing::debug!(field = ?other, "Ignoring multipart field"),
        }
    }

    let image = image
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| ApiError::bad_request("No image file provided"))?;
    let settings = OverlaySettings::parse(settings.as_deref())
        .map_err(|_| ApiError::bad_request("Invalid text overlay settings JSON"))?;

    let render = &state.config.render;
    let options = UploadOptions {
        max_width: render.max_width,
        max_height: render.max_height,
        watermark: Some(Watermark::upload(render.watermark.clone())),
        format: OutputFormat::Png,
    };

    tracing::info!(
        bytes = image.len(),
        captions = settings.texts.len(),
        "Processing uploaded image"
    );
    let png = tokio::task::spawn_blocking(move || process_upload(&image, &settings, &options))
        .await
        .map_err(|e| ApiError::internal(format!("Image processing task failed: {e}")))??;

    Ok(png_attachment(png, "memesmith-processed.png"))
}

/// Body of `POST /api/render`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Template to draw on.
    pub template_id: String,
    /// Top caption.
    #[serde(default)]
    pub top_text: String,
    /// Bottom caption.
    #[serde(default)]
    pub bottom_text: String,
    /// Caption effect; defaults to none.
    #[serde(default)]
    pub effect: Option<String>,
}

/// `POST /api/render`
///
/// Premium requests (a pro-only template or any effect) need a signed-in
/// user who is pro or has a credit. The credit is taken only once the image
/// has rendered.
pub async fn render(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Json(req): Json<RenderRequest>,
) -> Result<Response> {
    let template = state.catalog.get(&req.template_id)?.clone();
    let effect: Effect = req.effect.as_deref().unwrap_or_default().parse()?;
    let wants_premium = template.pro_only || effect.is_premium();

    let profile: Option<UserProfile> = match (&user, wants_premium) {
        (_, false) => None,
        (None, true) => {
            return Err(ApiError::Unauthorized(
                "Sign in to use premium templates and effects".to_string(),
            ));
        }
        (Some(user), true) => Some(
            state
                .store
                .get_or_create_user(&user.user_id, user.email.clone())
                .await?,
        ),
    };

    let entitlement = Entitlement::check(profile.as_ref(), wants_premium);
    if !entitlement.is_allowed() {
        return Err(ApiError::PaymentRequired(
            "Upgrade to MemeSmith Pro or buy credits to use premium templates and effects"
                .to_string(),
        ));
    }

    let base = state.template_image(&template).await?;
    let watermark = Watermark::template(&state.config.render.watermark);
    let file_name = format!("memesmith-{}.png", template.id);
    let template_id = template.id.clone();
    let (top, bottom) = (req.top_text, req.bottom_text);

    let png = tokio::task::spawn_blocking(move || {
        render_template(&template, &base, &top, &bottom, effect, &watermark)
    })
    .await
    .map_err(|e| ApiError::internal(format!("Render task failed: {e}")))??;

    tracing::info!(template = %template_id, %effect, ?entitlement, "Rendered template");
    let mut response = png_attachment(png, &file_name);

    if entitlement == Entitlement::SpendCredit {
        if let Some(user) = &user {
            let remaining = state.store.spend_credit(&user.user_id).await?;
            tracing::info!(user = %user.user_id, remaining, "Spent render credit");
            if let Ok(value) = HeaderValue::from_str(&remaining.to_string()) {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static(CREDITS_REMAINING_HEADER), value);
            }
        }
    }
    Ok(response)
}

fn png_attachment(png: Vec<u8>, file_name: &str) -> Response {
    let disposition = format!("attachment; filename=\"{file_name}\"");
    (
        [
            (CONTENT_TYPE, "image/png".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        png,
    )
        .into_response()
}
