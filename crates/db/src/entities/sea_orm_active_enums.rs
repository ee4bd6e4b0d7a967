//! `SeaORM` active enums mapped to PostgreSQL enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use microloan_core::ledger;
use microloan_core::workflow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "application_status")]
pub enum ApplicationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "repayment_status")]
pub enum RepaymentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "complete")]
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "fee_status")]
pub enum FeeStatus {
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    #[sea_orm(string_value = "paid")]
    Paid,
}

impl From<ApplicationStatus> for workflow::ApplicationStatus {
    fn from(value: ApplicationStatus) -> Self {
        match value {
            ApplicationStatus::Pending => Self::Pending,
            ApplicationStatus::Approved => Self::Approved,
            ApplicationStatus::Rejected => Self::Rejected,
            ApplicationStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<workflow::ApplicationStatus> for ApplicationStatus {
    fn from(value: workflow::ApplicationStatus) -> Self {
        match value {
            workflow::ApplicationStatus::Pending => Self::Pending,
            workflow::ApplicationStatus::Approved => Self::Approved,
            workflow::ApplicationStatus::Rejected => Self::Rejected,
            workflow::ApplicationStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<RepaymentStatus> for ledger::RepaymentStatus {
    fn from(value: RepaymentStatus) -> Self {
        match value {
            RepaymentStatus::Pending => Self::Pending,
            RepaymentStatus::InProgress => Self::InProgress,
            RepaymentStatus::Complete => Self::Complete,
        }
    }
}

impl From<ledger::RepaymentStatus> for RepaymentStatus {
    fn from(value: ledger::RepaymentStatus) -> Self {
        match value {
            ledger::RepaymentStatus::Pending => Self::Pending,
            ledger::RepaymentStatus::InProgress => Self::InProgress,
            ledger::RepaymentStatus::Complete => Self::Complete,
        }
    }
}

impl From<FeeStatus> for ledger::FeeStatus {
    fn from(value: FeeStatus) -> Self {
        match value {
            FeeStatus::Unpaid => Self::Unpaid,
            FeeStatus::Paid => Self::Paid,
        }
    }
}

impl From<ledger::FeeStatus> for FeeStatus {
    fn from(value: ledger::FeeStatus) -> Self {
        match value {
            ledger::FeeStatus::Unpaid => Self::Unpaid,
            ledger::FeeStatus::Paid => Self::Paid,
        }
    }
}
