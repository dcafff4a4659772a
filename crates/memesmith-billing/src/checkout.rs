//! Stripe Checkout sessions.

use std::time::Duration;

use memesmith_core::config::StripeConfig;
use memesmith_core::UserId;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{BillingError, Result};

/// Metadata value marking a credit-pack purchase.
pub const CREDITS_PRODUCT: &str = "credits";
/// Metadata value marking a Pro Pack purchase.
pub const PRO_PRODUCT: &str = "pro";

/// What a checkout sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    /// One-time upgrade to pro status.
    ProPack,
    /// A bundle of premium-render credits.
    CreditPack {
        /// Credits requested; rounded up to whole packs at checkout.
        credits: u32,
    },
}

impl Product {
    /// Parse the `product` field of a checkout request.
    ///
    /// Absent or `pro` selects the Pro Pack; `credits` selects a credit pack
    /// of `credits` (at least one pack).
    pub fn from_request(product: Option<&str>, credits: Option<u32>, pack_size: u32) -> Result<Self> {
        match product.map(str::trim).unwrap_or(PRO_PRODUCT) {
            "" | PRO_PRODUCT => Ok(Product::ProPack),
            CREDITS_PRODUCT => Ok(Product::CreditPack {
                credits: credits.filter(|c| *c > 0).unwrap_or(pack_size),
            }),
            other => Err(BillingError::InvalidRequest(format!("unknown product '{other}'"))),
        }
    }

    fn metadata_name(self) -> &'static str {
        match self {
            Product::ProPack => PRO_PRODUCT,
            Product::CreditPack { .. } => CREDITS_PRODUCT,
        }
    }
}

/// A request to start a checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    /// Buyer.
    pub user_id: UserId,
    /// Site origin to return to after payment.
    pub return_url: String,
    /// What is being bought.
    pub product: Product,
}

impl CheckoutRequest {
    /// Check the request before calling Stripe.
    pub fn validate(&self) -> Result<()> {
        let url = self.return_url.trim();
        if url.is_empty() {
            return Err(BillingError::InvalidRequest("returnUrl is required".to_string()));
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(BillingError::InvalidRequest(
                "returnUrl must be an http(s) URL".to_string(),
            ));
        }
        Ok(())
    }
}

/// The session Stripe created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Session id (`cs_...`).
    pub id: String,
    /// Hosted checkout page.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: String,
}

/// Minimal Stripe API client.
#[derive(Debug, Clone)]
pub struct StripeClient {
    http: Client,
    config: StripeConfig,
}

impl StripeClient {
    /// Create a client. Fails without a secret key.
    pub fn new(config: StripeConfig) -> Result<Self> {
        if config.secret_key.trim().is_empty() {
            return Err(BillingError::Config("Stripe secret key is not set".to_string()));
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// Create a one-time payment session.
    pub async fn create_checkout_session(&self, req: &CheckoutRequest) -> Result<CheckoutSession> {
        req.validate()?;
        let form = checkout_form(req, &self.config);
        let url = format!("{}/v1/checkout/sessions", self.config.api_base.trim_end_matches('/'));

        log::info!("Creating Stripe checkout session for {}", req.user_id);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<StripeErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            log::warn!("Stripe rejected checkout: {status} {message}");
            return Err(BillingError::Stripe {
                status: status.as_u16(),
                message,
            });
        }

        let session: CheckoutSession = serde_json::from_str(&body)?;
        log::info!("Checkout session created: {}", session.id);
        Ok(session)
    }
}

/// Form fields for `POST /v1/checkout/sessions`.
pub fn checkout_form(req: &CheckoutRequest, config: &StripeConfig) -> Vec<(String, String)> {
    let return_url = req.return_url.trim().trim_end_matches('/');
    let user = req.user_id.as_str();

    let (name, description, unit_amount, quantity, credits) = match req.product {
        Product::ProPack => (
            "MemeSmith Pro Pack".to_string(),
            "Unlock premium features for MemeSmith".to_string(),
            config.pro_price_cents,
            1,
            None,
        ),
        Product::CreditPack { credits } => {
            let pack = config.credit_pack_size.max(1);
            let packs = credits.div_ceil(pack).max(1);
            (
                "MemeSmith Credit Pack".to_string(),
                format!("{pack} premium renders for MemeSmith"),
                config.credit_pack_cents,
                packs,
                Some(packs.saturating_mul(pack)),
            )
        }
    };

    let mut form = vec![
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("line_items[0][price_data][currency]".to_string(), config.currency.clone()),
        ("line_items[0][price_data][product_data][name]".to_string(), name),
        (
            "line_items[0][price_data][product_data][description]".to_string(),
            description,
        ),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            unit_amount.to_string(),
        ),
        ("line_items[0][quantity]".to_string(), quantity.to_string()),
        ("mode".to_string(), "payment".to_string()),
        (
            "success_url".to_string(),
            format!("{return_url}/upgrade-success?session_id={{CHECKOUT_SESSION_ID}}"),
        ),
        ("cancel_url".to_string(), return_url.to_string()),
        ("client_reference_id".to_string(), user.to_string()),
        ("metadata[userId]".to_string(), user.to_string()),
        ("metadata[product]".to_string(), req.product.metadata_name().to_string()),
    ];
    if let Some(credits) = credits {
        form.push(("metadata[credits]".to_string(), credits.to_string()));
    }
    form
}
