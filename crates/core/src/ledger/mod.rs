//! Investment ledger.
//!
//! This module implements the ledger entry lifecycle:
//! - Entry, status and kind types
//! - The state machine deciding creation and transitions
//! - Error types for ledger operations

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::LedgerError;
pub use service::LedgerStateMachine;
pub use types::{LedgerEntry, LedgerStatus, SettlementOutcome, TradeRequest, TransactionKind};
