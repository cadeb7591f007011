//! Investor profiles, KYC and accreditation.

pub mod error;
pub mod service;

pub use error::InvestorError;
pub use service::{InvestorService, NewInvestor};
