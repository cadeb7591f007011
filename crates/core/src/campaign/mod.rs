//! Campaign management.

pub mod error;
pub mod service;

pub use error::CampaignError;
pub use service::{CampaignService, NewCampaign};
