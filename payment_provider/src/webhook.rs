//! Signed payment webhooks.
//!
//! The provider signs the raw request body with HMAC-SHA256, keyed by the shared webhook secret, and sends the lowercase
//! hex digest in the `webhook-signature` header. The signature must be checked against the exact bytes received,
//! before any JSON parsing takes place.
use hmac::{Hmac, Mac};
use log::*;
use serde::{Deserialize, Deserializer};
use sha2::Sha256;
use thiserror::Error;

use crate::data_objects::CartItem;

pub const SIGNATURE_HEADER: &str = "webhook-signature";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    #[error("The webhook signature header is missing")]
    MissingSignature,
    #[error("The webhook signature is invalid")]
    InvalidSignature,
    #[error("The webhook signing key is unusable. {0}")]
    InvalidKey(String),
    #[error("The webhook payload could not be parsed. {0}")]
    InvalidPayload(String),
}

/// Hex-encoded HMAC-SHA256 of `body`, keyed with `secret`.
pub fn calculate_hmac(secret: &str, body: &[u8]) -> Result<String, WebhookError> {
    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(secret.as_bytes()).map_err(|e| WebhookError::InvalidKey(e.to_string()))?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks `signature` against the body in constant time.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> Result<(), WebhookError> {
    if secret.is_empty() {
        return Err(WebhookError::InvalidKey("no webhook secret is configured".into()));
    }
    let expected = hex::decode(signature.trim()).map_err(|e| {
        debug!("🪝️ Webhook signature is not valid hex. {e}");
        WebhookError::InvalidSignature
    })?;
    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(secret.as_bytes()).map_err(|e| WebhookError::InvalidKey(e.to_string()))?;
    mac.update(body);
    mac.verify_slice(&expected).map_err(|_| WebhookError::InvalidSignature)
}

/// Authenticates the raw body and then parses it. Nothing is parsed unless the signature is valid.
pub fn verify_and_parse(secret: &str, body: &[u8], signature: Option<&str>) -> Result<WebhookPayload, WebhookError> {
    let signature = signature.ok_or(WebhookError::MissingSignature)?;
    verify_signature(secret, body, signature)?;
    let payload = serde_json::from_slice::<WebhookPayload>(body).map_err(|e| {
        warn!("🪝️ Signed webhook body could not be deserialized. {e}");
        WebhookError::InvalidPayload(e.to_string())
    })?;
    trace!("🪝️ Verified webhook {} for payment {}", payload.event_type, payload.data.payment_id);
    Ok(payload)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventType {
    PaymentSucceeded,
    PaymentFailed,
    Other(String),
}

impl From<&str> for WebhookEventType {
    fn from(value: &str) -> Self {
        match value {
            "payment.succeeded" => Self::PaymentSucceeded,
            "payment.failed" => Self::PaymentFailed,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: PaymentData,
}

impl WebhookPayload {
    pub fn event(&self) -> WebhookEventType {
        WebhookEventType::from(self.event_type.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentData {
    pub customer: WebhookCustomer,
    #[serde(default)]
    pub product_cart: Vec<CartItem>,
    pub payment_id: String,
    pub metadata: PaymentMetadata,
    pub total_amount: i64,
    #[serde(default)]
    pub settled_amount: i64,
    pub currency: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookCustomer {
    pub customer_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

/// The metadata attached when the checkout session was opened. The provider echoes metadata values back as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMetadata {
    #[serde(deserialize_with = "string_or_number")]
    pub order_id: i64,
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: i64,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(i64),
        Text(String),
    }
    match Id::deserialize(deserializer)? {
        Id::Number(n) => Ok(n),
        Id::Text(s) => s.trim().parse::<i64>().map_err(serde::de::Error::custom),
    }
}
