//! Billing event repository. Insert and read only.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::entities::billing_events;

/// Append-only billing event repository.
#[derive(Debug, Clone)]
pub struct BillingRepository {
    db: DatabaseConnection,
}

impl BillingRepository {
    /// Creates a new billing repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends a billing event. Runs on the pool, outside any investment
    /// transaction, so it is durable on its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn append(
        &self,
        model: billing_events::ActiveModel,
    ) -> Result<billing_events::Model, DbErr> {
        Self::append_with(&self.db, model).await
    }

    /// Appends a billing event on any connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn append_with<C: ConnectionTrait>(
        conn: &C,
        model: billing_events::ActiveModel,
    ) -> Result<billing_events::Model, DbErr> {
        model.insert(conn).await
    }

    /// Billing events of an investor, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn for_investor(
        &self,
        investor_id: Uuid,
    ) -> Result<Vec<billing_events::Model>, DbErr> {
        billing_events::Entity::find()
            .filter(billing_events::Column::InvestorId.eq(investor_id))
            .order_by_asc(billing_events::Column::CreatedAt)
            .all(&self.db)
            .await
    }
}
