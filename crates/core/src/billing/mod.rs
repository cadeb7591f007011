//! Validation fee billing.
//!
//! One write-once billing event per successful compliance pass, recorded
//! before the payment call and never reversed.

pub mod service;

pub use service::{BillingEvent, BillingService};
