//! Settlement reconciliation.
//!
//! Two independent producers drive entries to a terminal status: provider
//! webhooks and the delayed settlement task. Both go through a
//! compare-and-set on the current status, so they are safe to run
//! concurrently against the same entry.

pub mod error;
pub mod reconciler;

pub use error::SettlementError;
pub use reconciler::{SettlementReconciler, WebhookAck};
