//! Webhook signature verification and event parsing.
//!
//! Header format: `t=<unix seconds>,v1=<hex hmac-sha256>`, where the MAC is
//! computed over `"{t}.{payload}"` with the shared webhook secret. More than
//! one `v1` entry may be present during secret rotation.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::ledger::SettlementOutcome;
use crate::payment::error::PaymentError;

type HmacSha256 = Hmac<Sha256>;

/// Event type emitted when a hold is captured.
pub const EVENT_PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";

/// Event type emitted when a payment fails.
pub const EVENT_PAYMENT_FAILED: &str = "payment_intent.payment_failed";

/// A verified provider event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEvent {
    /// Raw event type.
    pub event_type: String,
    /// Payment reference the event is about.
    pub reference: Option<String>,
    /// Settlement outcome, `None` for event types that do not settle.
    pub outcome: Option<SettlementOutcome>,
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: RawData,
}

#[derive(Deserialize)]
struct RawData {
    object: RawObject,
}

#[derive(Deserialize)]
struct RawObject {
    id: Option<String>,
}

/// Verifies webhook deliveries against the shared secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("secret", &"[hidden]")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish()
    }
}

impl WebhookVerifier {
    /// Creates a verifier.
    #[must_use]
    pub fn new(secret: impl Into<String>, tolerance_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs,
        }
    }

    fn mac(&self, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, PaymentError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| PaymentError::InvalidSignature)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac)
    }

    /// Builds a signature header for `payload` at `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidSignature` if the secret is unusable.
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> Result<String, PaymentError> {
        let digest = self.mac(timestamp, payload)?.finalize().into_bytes();
        Ok(format!("t={timestamp},v1={}", hex::encode(digest)))
    }

    /// Checks the signature header, rejecting anything outside the tolerance.
    pub fn verify(
        &self,
        payload: &[u8],
        header: &str,
        now: DateTime<Utc>,
    ) -> Result<(), PaymentError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();
        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
                Some(("v1", value)) => signatures.push(value),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(PaymentError::InvalidSignature)?;
        if now.timestamp().abs_diff(timestamp) > self.tolerance_secs.unsigned_abs() {
            return Err(PaymentError::InvalidSignature);
        }

        let mac = self.mac(timestamp, payload)?;
        let matched = signatures.into_iter().any(|candidate| {
            hex::decode(candidate)
                .is_ok_and(|bytes| mac.clone().verify_slice(&bytes).is_ok())
        });

        if matched {
            Ok(())
        } else {
            Err(PaymentError::InvalidSignature)
        }
    }

    /// Verifies and parses an event. No state is touched before this passes.
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        header: &str,
        now: DateTime<Utc>,
    ) -> Result<ProviderEvent, PaymentError> {
        self.verify(payload, header, now)?;

        let raw: RawEvent =
            serde_json::from_slice(payload).map_err(|e| PaymentError::Malformed(e.to_string()))?;

        let outcome = match raw.event_type.as_str() {
            EVENT_PAYMENT_SUCCEEDED => Some(SettlementOutcome::Succeeded),
            EVENT_PAYMENT_FAILED => Some(SettlementOutcome::Failed),
            _ => None,
        };

        Ok(ProviderEvent {
            event_type: raw.event_type,
            reference: raw.data.object.id,
            outcome,
        })
    }
}
