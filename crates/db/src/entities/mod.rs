//! `SeaORM` entity definitions.

pub mod billing_events;
pub mod campaigns;
pub mod investors;
pub mod ledger_entries;
