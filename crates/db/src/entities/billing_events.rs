//! `SeaORM` Entity for billing_events table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "billing_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub investor_id: Uuid,
    pub reference: String,
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub fee_amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::investors::Entity",
        from = "Column::InvestorId",
        to = "super::investors::Column::Id"
    )]
    Investors,
}

impl Related<super::investors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
