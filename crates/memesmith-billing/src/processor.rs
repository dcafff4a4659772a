//! Applying verified webhook events to user profiles.

use std::sync::Arc;

use memesmith_core::UserId;
use memesmith_store::UserStore;
use serde_json::Value;

use crate::checkout::CREDITS_PRODUCT;
use crate::webhook::WebhookEvent;
use crate::{BillingError, Result};

/// Event type for a finished checkout.
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// What handling an event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The buyer is now pro.
    UpgradedToPro {
        /// Buyer
        user_id: UserId,
    },
    /// Credits were added.
    CreditsAdded {
        /// Buyer
        user_id: UserId,
        /// New balance
        balance: u32,
    },
    /// The event was already handled on an earlier delivery.
    Duplicate {
        /// Stripe event id
        event_id: String,
    },
    /// Nothing to do for this event.
    Ignored {
        /// The event type that was skipped
        event_type: String,
    },
}

/// Updates profiles from Stripe events.
pub struct WebhookProcessor<S: UserStore + ?Sized> {
    store: Arc<S>,
}

impl<S: UserStore + ?Sized> WebhookProcessor<S> {
    /// Create a processor writing to `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Handle one verified event.
    ///
    /// Stripe delivers at least once, so each event id is applied at most
    /// once. If applying fails the id is released again and the retry is
    /// handled normally.
    pub async fn process(&self, event: &WebhookEvent) -> Result<WebhookOutcome> {
        if event.event_type != CHECKOUT_COMPLETED {
            log::debug!("Ignoring Stripe event {} ({})", event.id, event.event_type);
            return Ok(WebhookOutcome::Ignored {
                event_type: event.event_type.clone(),
            });
        }

        let session = &event.data.object;
        let user_id = session_user(session)?;

        // Delayed payment methods complete the session before the money arrives.
        if str_field(session, "payment_status") == Some("unpaid") {
            log::info!("Checkout {} for {user_id} completed but unpaid", event.id);
            return Ok(WebhookOutcome::Ignored {
                event_type: event.event_type.clone(),
            });
        }

        if !self.store.record_event(&event.id).await? {
            log::info!("Stripe event {} already handled; skipping", event.id);
            return Ok(WebhookOutcome::Duplicate {
                event_id: event.id.clone(),
            });
        }

        match self.apply(session, user_id).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                if let Err(forget) = self.store.forget_event(&event.id).await {
                    log::error!("Failed to release Stripe event {}: {forget}", event.id);
                }
                Err(e)
            }
        }
    }

    async fn apply(&self, session: &Value, user_id: UserId) -> Result<WebhookOutcome> {
        self.store.get_or_create_user(&user_id, None).await?;

        let metadata = session.get("metadata");
        let product = metadata.and_then(|m| str_field(m, "product"));
        if product == Some(CREDITS_PRODUCT) {
            let credits = metadata
                .and_then(|m| m.get("credits"))
                .map(parse_credits)
                .transpose()?
                .ok_or_else(|| BillingError::InvalidMetadata("credits missing".to_string()))?;
            let balance = self.store.add_credits(&user_id, credits).await?;
            log::info!("Added {credits} credits to {user_id}; balance {balance}");
            return Ok(WebhookOutcome::CreditsAdded { user_id, balance });
        }

        self.store.set_pro(&user_id, true).await?;
        log::info!("Upgraded {user_id} to pro");
        Ok(WebhookOutcome::UpgradedToPro { user_id })
    }
}

/// The buyer: `client_reference_id`, falling back to `metadata.userId`.
fn session_user(session: &Value) -> Result<UserId> {
    str_field(session, "client_reference_id")
        .or_else(|| session.get("metadata").and_then(|m| str_field(m, "userId")))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(UserId::new)
        .ok_or(BillingError::MissingUserReference)
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Stripe metadata values are strings; accept bare numbers too.
fn parse_credits(value: &Value) -> Result<u32> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<u32>().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    };
    match parsed {
        Some(n) if n > 0 => Ok(n),
        _ => Err(BillingError::InvalidMetadata(format!("bad credits value {value}"))),
    }
}
