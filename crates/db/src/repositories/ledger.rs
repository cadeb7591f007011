//! Ledger entry repository for database operations.
//!
//! Status changes are compare-and-set: the `UPDATE` matches on the expected
//! current statuses, so two writers racing on one entry cannot both win.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::entities::ledger_entries;

const INVESTMENT: &str = "investment";

/// Statuses counted toward the investment cap and the pledged total.
pub const COMMITTED_STATUSES: [&str; 3] = ["pending_payment", "pending_settlement", "settled"];

/// Ledger entry repository.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts an entry on any connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn insert_with<C: ConnectionTrait>(
        conn: &C,
        model: ledger_entries::ActiveModel,
    ) -> Result<ledger_entries::Model, DbErr> {
        model.insert(conn).await
    }

    /// Inserts an entry on the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn insert(
        &self,
        model: ledger_entries::ActiveModel,
    ) -> Result<ledger_entries::Model, DbErr> {
        Self::insert_with(&self.db, model).await
    }

    /// Sum of the investor's committed investments created at or after
    /// `since`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn trailing_investment_sum<C: ConnectionTrait>(
        conn: &C,
        investor_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Decimal, DbErr> {
        let total: Option<Option<Decimal>> = ledger_entries::Entity::find()
            .select_only()
            .column_as(ledger_entries::Column::Amount.sum(), "total")
            .filter(ledger_entries::Column::InvestorId.eq(investor_id))
            .filter(ledger_entries::Column::TransactionType.eq(INVESTMENT))
            .filter(ledger_entries::Column::Status.is_in(COMMITTED_STATUSES))
            .filter(ledger_entries::Column::CreatedAt.gte(since))
            .into_tuple()
            .one(conn)
            .await?;
        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }

    /// Sum of committed investments in a campaign.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn pledged_total(&self, campaign_id: Uuid) -> Result<Decimal, DbErr> {
        let total: Option<Option<Decimal>> = ledger_entries::Entity::find()
            .select_only()
            .column_as(ledger_entries::Column::Amount.sum(), "total")
            .filter(ledger_entries::Column::CampaignId.eq(campaign_id))
            .filter(ledger_entries::Column::TransactionType.eq(INVESTMENT))
            .filter(ledger_entries::Column::Status.is_in(COMMITTED_STATUSES))
            .into_tuple()
            .one(&self.db)
            .await?;
        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }

    /// Finds an entry by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ledger_entries::Model>, DbErr> {
        ledger_entries::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds the entry bound to a payment reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_payment_ref(
        &self,
        reference: &str,
    ) -> Result<Option<ledger_entries::Model>, DbErr> {
        ledger_entries::Entity::find()
            .filter(ledger_entries::Column::PaymentReference.eq(reference))
            .one(&self.db)
            .await
    }

    /// Sets `to` where the current status is one of `from`.
    ///
    /// Returns `None` if no row matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn transition_status(
        &self,
        id: Uuid,
        from: &[&str],
        to: &str,
    ) -> Result<Option<ledger_entries::Model>, DbErr> {
        let updated = ledger_entries::Entity::update_many()
            .col_expr(ledger_entries::Column::Status, Expr::value(to))
            .filter(ledger_entries::Column::Id.eq(id))
            .filter(ledger_entries::Column::Status.is_in(from.iter().copied()))
            .exec_with_returning(&self.db)
            .await?;
        Ok(updated.into_iter().next())
    }

    /// Lists an investor's entries newest first, with the total count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_investor(
        &self,
        investor_id: Uuid,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<ledger_entries::Model>, u64), DbErr> {
        let query = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::InvestorId.eq(investor_id));

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(ledger_entries::Column::CreatedAt)
            .order_by_desc(ledger_entries::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok((rows, total))
    }
}
