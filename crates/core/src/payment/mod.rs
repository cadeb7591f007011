//! Payment provider integration.
//!
//! # Modules
//!
//! - `provider` - The hold/refund contract consumed by the core
//! - `webhook` - Signature verification and event parsing
//! - `stripe` - HTTP implementation of the contract
//! - `error` - Payment errors

pub mod error;
pub mod provider;
pub mod stripe;
pub mod webhook;

pub use error::PaymentError;
#[cfg(test)]
pub use provider::MockPaymentProvider;
pub use provider::{HoldMetadata, PaymentHold, PaymentProvider, RefundOutcome};
pub use stripe::StripeClient;
pub use webhook::{EVENT_PAYMENT_FAILED, EVENT_PAYMENT_SUCCEEDED, ProviderEvent, WebhookVerifier};
