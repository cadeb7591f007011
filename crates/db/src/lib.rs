//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for investors, campaigns, ledger entries and billing events
//! - Repository abstractions for data access
//! - [`PgComplianceStore`], the `PostgreSQL` implementation of the compliance store
//! - Database migrations

pub mod entities;
pub mod lock;
pub mod migration;
pub mod repositories;
pub mod store;

pub use lock::InvestorLock;
pub use migration::Migrator;
pub use repositories::{BillingRepository, CampaignRepository, InvestorRepository, LedgerRepository};
pub use store::PgComplianceStore;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use regrouter_shared::DatabaseConfig;

/// Establishes a pooled connection using the configured pool bounds.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}
