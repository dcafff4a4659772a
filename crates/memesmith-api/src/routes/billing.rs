//! Stripe checkout and webhook routes.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use memesmith_auth::AuthenticatedUser;
use memesmith_billing::{
    construct_event, BillingError, CheckoutRequest, Product, WebhookOutcome, WebhookProcessor,
    SIGNATURE_HEADER,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Body of `POST /api/create-checkout`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutBody {
    /// Site origin to come back to.
    #[serde(default)]
    pub return_url: String,
    /// `pro` (default) or `credits`.
    #[serde(default)]
    pub product: Option<String>,
    /// Credits wanted, for `credits` purchases.
    #[serde(default)]
    pub credits: Option<u32>,
}

/// `POST /api/create-checkout`
///
/// The buyer is always the signed-in user.
pub async fn create_checkout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateCheckoutBody>,
) -> Result<Json<Value>> {
    let product = Product::from_request(
        body.product.as_deref(),
        body.credits,
        state.config.stripe.credit_pack_size,
    )?;
    let request = CheckoutRequest {
        user_id: user.user_id,
        return_url: body.return_url,
        product,
    };
    request.validate()?;

    let stripe = state
        .stripe
        .as_ref()
        .ok_or_else(|| ApiError::internal("Stripe is not configured"))?;

    tracing::info!(user = %request.user_id, ?product, "Creating checkout session");
    let session = stripe.create_checkout_session(&request).await?;
    tracing::info!(session = %session.id, "Checkout session created");

    Ok(Json(json!({
        "sessionId": session.id,
        "url": session.url,
    })))
}

/// `POST /api/stripe-webhook`
///
/// The body must be read raw; the signature covers its exact bytes.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    tracing::info!(bytes = body.len(), "Stripe webhook received");

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(BillingError::MissingHeader)?;

    let stripe = &state.config.stripe;
    let event = construct_event(&body, signature, &stripe.webhook_secret, stripe.tolerance_secs)
        .inspect_err(|e| tracing::warn!("Webhook signature verification failed: {e}"))?;
    tracing::info!(event = %event.id, kind = %event.event_type, "Webhook verified");

    let processor = WebhookProcessor::new(state.store.clone());
    match processor.process(&event).await {
        Ok(WebhookOutcome::UpgradedToPro { user_id }) => {
            tracing::info!(user = %user_id, "User upgraded to pro");
        }
        Ok(WebhookOutcome::CreditsAdded { user_id, balance }) => {
            tracing::info!(user = %user_id, balance, "Credits added");
        }
        Ok(WebhookOutcome::Duplicate { event_id }) => {
            tracing::info!(event = %event_id, "Webhook event already handled");
        }
        Ok(WebhookOutcome::Ignored { event_type }) => {
            tracing::debug!(kind = %event_type, "Webhook event ignored");
        }
        Err(BillingError::Store(e)) => {
            tracing::error!("Error updating user profile: {e}");
            return Err(ApiError::internal("Error updating user profile"));
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Json(json!({ "received": true })))
}
