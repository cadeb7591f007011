//! Investor repository for database operations.

use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Set};
use uuid::Uuid;

use crate::entities::investors;

/// Investor repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct InvestorRepository {
    db: DatabaseConnection,
}

impl InvestorRepository {
    /// Creates a new investor repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts an investor.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including a unique violation on
    /// the email.
    pub async fn create(
        &self,
        model: investors::ActiveModel,
    ) -> Result<investors::Model, DbErr> {
        model.insert(&self.db).await
    }

    /// Finds an investor by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<investors::Model>, DbErr> {
        Self::find_with(&self.db, id).await
    }

    /// Finds an investor by ID on any connection, e.g. inside a locked
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_with<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<Option<investors::Model>, DbErr> {
        investors::Entity::find_by_id(id).one(conn).await
    }

    /// Saves KYC and accreditation columns. Returns `None` if the investor
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update_compliance(
        &self,
        model: &investors::Model,
    ) -> Result<Option<investors::Model>, DbErr> {
        if self.find_by_id(model.id).await?.is_none() {
            return Ok(None);
        }

        let updated = investors::ActiveModel {
            id: Set(model.id),
            kyc_status: Set(model.kyc_status.clone()),
            is_accredited: Set(model.is_accredited),
            accreditation_status: Set(model.accreditation_status.clone()),
            accreditation_verified_at: Set(model.accreditation_verified_at),
            accreditation_verified_by: Set(model.accreditation_verified_by),
            accreditation_expiry: Set(model.accreditation_expiry),
            ..Default::default()
        }
        .update(&self.db)
        .await?;

        Ok(Some(updated))
    }
}
