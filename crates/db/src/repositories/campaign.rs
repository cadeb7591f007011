//! Campaign repository for database operations.

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::entities::campaigns;

/// Campaign repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CampaignRepository {
    db: DatabaseConnection,
}

impl CampaignRepository {
    /// Creates a new campaign repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a campaign.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, model: campaigns::ActiveModel) -> Result<campaigns::Model, DbErr> {
        model.insert(&self.db).await
    }

    /// Finds a campaign by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<campaigns::Model>, DbErr> {
        campaigns::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists campaigns oldest first, with the total count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<campaigns::Model>, u64), DbErr> {
        let total = campaigns::Entity::find().count(&self.db).await?;
        let rows = campaigns::Entity::find()
            .order_by_asc(campaigns::Column::CreatedAt)
            .order_by_asc(campaigns::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok((rows, total))
    }
}
