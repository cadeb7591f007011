//! `SeaORM` Entity for investors table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "investors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub kyc_status: String,
    pub is_accredited: bool,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))", nullable)]
    pub net_worth: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))", nullable)]
    pub annual_income: Option<Decimal>,
    pub accreditation_status: String,
    pub accreditation_verified_at: Option<DateTimeWithTimeZone>,
    pub accreditation_verified_by: Option<Uuid>,
    pub accreditation_expiry: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ledger_entries::Entity")]
    LedgerEntries,
    #[sea_orm(has_many = "super::billing_events::Entity")]
    BillingEvents,
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl Related<super::billing_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BillingEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
