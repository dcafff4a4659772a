//! MemeSmith Billing: Stripe checkout and webhooks.
//!
//! - [`StripeClient`] creates one-time Checkout sessions for the Pro Pack or
//!   credit packs.
//! - [`construct_event`] verifies a `Stripe-Signature` header and decodes
//!   the event.
//! - [`WebhookProcessor`] applies `checkout.session.completed` events to the
//!   buyer's profile.

#![forbid(unsafe_code)]

pub mod checkout;
pub mod error;
pub mod processor;
pub mod webhook;

pub use checkout::{checkout_form, CheckoutRequest, CheckoutSession, Product, StripeClient};
pub use error::{BillingError, Result};
pub use processor::{WebhookOutcome, WebhookProcessor, CHECKOUT_COMPLETED};
pub use webhook::{
    construct_event, parse_header, sign_payload, verify_signature, WebhookEvent, SIGNATURE_HEADER,
};
