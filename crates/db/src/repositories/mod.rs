//! Repository abstractions for data access.

pub mod billing;
pub mod campaign;
pub mod investor;
pub mod ledger;

pub use billing::BillingRepository;
pub use campaign::CampaignRepository;
pub use investor::InvestorRepository;
pub use ledger::LedgerRepository;
