//! # Stripe Webhook Handling
//!
//! Signature verification for Stripe webhooks and the mapping of Checkout
//! Session events onto payment status updates.

use checkout_core::{CheckoutError, CheckoutResult, PaymentStatus, PaymentUpdate};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// Maximum age of a signed webhook, in seconds
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// A Stripe event as delivered to the webhook endpoint
#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub created: i64,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Map<String, serde_json::Value>,
}

/// Fields of a Checkout Session used by the shop
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionData {
    pub id: String,
    #[serde(default)]
    pub payment_status: String,
    #[serde(default)]
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSessionData {
    /// Parse from the object of a webhook event
    pub fn from_event(event: &StripeEvent) -> CheckoutResult<Self> {
        serde_json::from_value(serde_json::Value::Object(event.data.object.clone())).map_err(
            |e| CheckoutError::Serialization(format!("Invalid checkout session in event: {}", e)),
        )
    }

    /// The shop's order ID (metadata first, then the client reference)
    pub fn order_id(&self) -> Option<&str> {
        self.metadata
            .get("order_id")
            .map(String::as_str)
            .or(self.client_reference_id.as_deref())
    }

    /// Payment status the order should get for this session
    pub fn status(&self) -> Option<PaymentStatus> {
        map_payment_status(&self.payment_status)
    }
}

/// Map a Checkout Session `payment_status` onto an order payment status
pub fn map_payment_status(status: &str) -> Option<PaymentStatus> {
    match status {
        "paid" => Some(PaymentStatus::Received),
        "unpaid" => Some(PaymentStatus::Pending),
        "no_payment_required" => Some(PaymentStatus::Authorized),
        _ => None,
    }
}

/// Payment update carried by an event, if any
pub fn payment_update(event: &StripeEvent) -> CheckoutResult<Option<PaymentUpdate>> {
    let status = match event.event_type.as_str() {
        "checkout.session.completed" => None,
        "checkout.session.async_payment_succeeded" => Some(PaymentStatus::Received),
        "checkout.session.async_payment_failed" => Some(PaymentStatus::Refused),
        "checkout.session.expired" => Some(PaymentStatus::Canceled),
        other => {
            debug!("Ignoring Stripe event {}: type={}", event.id, other);
            return Ok(None);
        }
    };

    let session = CheckoutSessionData::from_event(event)?;
    let Some(status) = status.or_else(|| session.status()) else {
        debug!(
            "Checkout session {} has unmapped payment status {:?}",
            session.id, session.payment_status
        );
        return Ok(None);
    };

    let order_id = session.order_id().ok_or_else(|| {
        CheckoutError::Provider {
            provider: "stripe".to_string(),
            message: format!("Checkout session {} carries no order ID", session.id),
        }
    })?;

    Ok(Some(PaymentUpdate {
        order_id: order_id.to_string(),
        status,
    }))
}

/// Verify a `Stripe-Signature` header against the raw payload
pub fn verify_signature(
    secret: &str,
    payload: &[u8],
    header: &str,
    now: i64,
) -> CheckoutResult<()> {
    let sig_parts = parse_signature_header(header)?;

    if now.abs_diff(sig_parts.timestamp) > SIGNATURE_TOLERANCE_SECS.unsigned_abs() {
        return Err(CheckoutError::WebhookVerificationFailed(
            "Timestamp outside tolerance".to_string(),
        ));
    }

    let expected_sig = compute_hmac_sha256(secret, &signed_payload(sig_parts.timestamp, payload))?;

    let valid = sig_parts
        .signatures
        .iter()
        .any(|sig| constant_time_compare(sig, &expected_sig));

    if !valid {
        return Err(CheckoutError::WebhookVerificationFailed(
            "Signature mismatch".to_string(),
        ));
    }

    Ok(())
}

/// Build a `Stripe-Signature` header value (local tooling and tests)
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> CheckoutResult<String> {
    let signature = compute_hmac_sha256(secret, &signed_payload(timestamp, payload))?;
    Ok(format!("t={},v1={}", timestamp, signature))
}

fn signed_payload(timestamp: i64, payload: &[u8]) -> String {
    format!("{}.{}", timestamp, String::from_utf8_lossy(payload))
}

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> CheckoutResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => signatures.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        CheckoutError::WebhookVerificationFailed("Missing timestamp in signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(CheckoutError::WebhookVerificationFailed(
            "No v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn compute_hmac_sha256(secret: &str, message: &str) -> CheckoutResult<String> {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CheckoutError::Internal(format!("HMAC key rejected: {}", e)))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}
