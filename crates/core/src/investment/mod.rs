//! Investment orchestration.
//!
//! # Modules
//!
//! - `service` - Invest, cancel, trade and escrow queries
//! - `error` - Investment errors

pub mod error;
pub mod service;


pub use error::InvestmentError;
pub use service::{EscrowStatus, InvestmentReceipt, InvestmentService};
