//! `SeaORM` Entity for leave_accounts table.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "leave_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub employee_id: Uuid,
    pub organization_id: Uuid,
    pub employee_name: String,
    pub employee_code: String,
    #[sea_orm(column_type = "Decimal(Some((7, 2)))")]
    pub casual: Decimal,
    #[sea_orm(column_type = "Decimal(Some((7, 2)))")]
    pub sick: Decimal,
    #[sea_orm(column_type = "Decimal(Some((7, 2)))")]
    pub annual: Decimal,
    #[sea_orm(column_type = "Decimal(Some((7, 2)))")]
    pub parental: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::leave_requests::Entity")]
    LeaveRequests,
}

impl Related<super::leave_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeaveRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
