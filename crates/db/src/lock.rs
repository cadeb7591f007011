//! Per-investor transaction locks.
//!
//! An [`InvestorLock`] is a database transaction holding
//! `pg_advisory_xact_lock` keyed by the investor ID. Postgres releases the
//! lock when the transaction commits or rolls back, including when the
//! wrapper is dropped.
//!
//! # Usage
//!
//! ```ignore
//! use regrouter_db::lock::InvestorLock;
//!
//! let lock = InvestorLock::acquire(&db, investor_id).await?;
//! let sum = LedgerRepository::trailing_investment_sum(lock.transaction(), investor_id, since).await?;
//! lock.commit().await?;
//! ```

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, Statement,
    TransactionTrait,
};
use uuid::Uuid;

const ADVISORY_LOCK_SQL: &str = "SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))";

/// A transaction serialized against every other [`InvestorLock`] for the
/// same investor.
pub struct InvestorLock {
    txn: DatabaseTransaction,
}

impl InvestorLock {
    /// Begins a transaction and blocks until the investor's advisory lock is
    /// granted.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the lock
    /// statement fails.
    pub async fn acquire(db: &DatabaseConnection, investor_id: Uuid) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        txn.execute(advisory_lock_statement(investor_id)).await?;
        Ok(Self { txn })
    }

    /// Returns the underlying transaction for executing queries.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction and releases the lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Rolls back the transaction and releases the lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

/// Builds the lock statement for an investor.
#[must_use]
pub fn advisory_lock_statement(investor_id: Uuid) -> Statement {
    Statement::from_sql_and_values(
        DbBackend::Postgres,
        ADVISORY_LOCK_SQL,
        [investor_id.to_string().into()],
    )
}
