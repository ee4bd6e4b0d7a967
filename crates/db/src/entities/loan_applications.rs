//! `SeaORM` Entity for loan_applications table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ApplicationStatus, FeeStatus, RepaymentStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "loan_applications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub loan_id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub loan_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((9, 4)))", nullable)]
    pub interest_rate: Option<Decimal>,
    pub status: ApplicationStatus,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub total_amount: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub paid_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub remaining_amount: Option<Decimal>,
    pub repayment_status: RepaymentStatus,
    pub application_fee_status: FeeStatus,
    pub fee_transaction_id: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub fee_amount: Option<Decimal>,
    pub fee_paid_at: Option<DateTimeWithTimeZone>,
    pub fee_payment_method: Option<String>,
    pub version: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::repayments::Entity")]
    Repayments,
}

impl Related<super::repayments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Repayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
