//! Stripe webhook signature verification.
//!
//! Stripe signs each delivery with a header of the form
//! `t=1492774577,v1=5257a869...,v0=...`. The `v1` value is the hex
//! HMAC-SHA256 of `"{t}.{raw body}"` keyed by the endpoint secret. Several
//! `v1` entries may be present while a secret is being rolled.

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{BillingError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Name of the signature header.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// A parsed `Stripe-Signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Signing time, seconds since the epoch.
    pub timestamp: i64,
    /// Hex-encoded `v1` signatures.
    pub signatures: Vec<String>,
}

/// Parse a `Stripe-Signature` header value.
pub fn parse_header(header: &str) -> Result<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for item in header.split(',') {
        let Some((key, value)) = item.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => {
                let t = value
                    .parse::<i64>()
                    .map_err(|_| BillingError::MalformedHeader(format!("bad timestamp '{value}'")))?;
                timestamp = Some(t);
            }
            "v1" => signatures.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| BillingError::MalformedHeader("no timestamp".to_string()))?;
    if signatures.is_empty() {
        return Err(BillingError::NoMatchingSignature);
    }
    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

/// Check `payload` against a signature header at time `now`.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: u64,
    now: i64,
) -> Result<()> {
    if secret.is_empty() {
        return Err(BillingError::Config("webhook secret is not set".to_string()));
    }
    let parsed = parse_header(header)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BillingError::Config(format!("invalid webhook secret: {e}")))?;
    mac.update(parsed.timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = parsed.signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if !matched {
        return Err(BillingError::NoMatchingSignature);
    }

    let skew = now.abs_diff(parsed.timestamp);
    if tolerance_secs > 0 && skew > tolerance_secs {
        return Err(BillingError::TimestampOutOfTolerance {
            timestamp: parsed.timestamp,
            now,
        });
    }
    Ok(())
}

/// Hex `v1` signature for `payload` signed at `timestamp`.
pub fn compute_signature(payload: &[u8], secret: &str, timestamp: i64) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BillingError::Config(format!("invalid webhook secret: {e}")))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// A full `Stripe-Signature` header for `payload`, as Stripe would send it.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> Result<String> {
    Ok(format!(
        "t={timestamp},v1={}",
        compute_signature(payload, secret, timestamp)?
    ))
}

/// A Stripe event envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event id (`evt_...`).
    #[serde(default)]
    pub id: String,
    /// Event type, e.g. `checkout.session.completed`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event body.
    pub data: EventData,
}

/// The `data` member of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    /// The API object the event is about.
    pub object: serde_json::Value,
}

/// Verify a delivery and decode its event.
pub fn construct_event(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: u64,
) -> Result<WebhookEvent> {
    verify_signature(payload, header, secret, tolerance_secs, unix_now())?;
    let event: WebhookEvent = serde_json::from_slice(payload)?;
    log::debug!("Verified Stripe event {} ({})", event.id, event.event_type);
    Ok(event)
}

/// Current time in whole seconds.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
