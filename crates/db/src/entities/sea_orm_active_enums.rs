//! `SeaORM` active enums mirroring the PostgreSQL enum types.

use hrm_core::leave;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `leave_category` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "leave_category")]
pub enum LeaveCategory {
    /// Casual leave.
    #[sea_orm(string_value = "casual")]
    Casual,
    /// Sick leave.
    #[sea_orm(string_value = "sick")]
    Sick,
    /// Annual leave.
    #[sea_orm(string_value = "annual")]
    Annual,
    /// Parental leave.
    #[sea_orm(string_value = "parental")]
    Parental,
}

/// `leave_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "leave_status")]
pub enum LeaveStatus {
    /// Waiting for review.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Being reviewed.
    #[sea_orm(string_value = "processing")]
    Processing,
    /// Approved.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Denied.
    #[sea_orm(string_value = "denied")]
    Denied,
}

impl From<leave::LeaveCategory> for LeaveCategory {
    fn from(value: leave::LeaveCategory) -> Self {
        match value {
            leave::LeaveCategory::Casual => Self::Casual,
            leave::LeaveCategory::Sick => Self::Sick,
            leave::LeaveCategory::Annual => Self::Annual,
            leave::LeaveCategory::Parental => Self::Parental,
        }
    }
}

impl From<LeaveCategory> for leave::LeaveCategory {
    fn from(value: LeaveCategory) -> Self {
        match value {
            LeaveCategory::Casual => Self::Casual,
            LeaveCategory::Sick => Self::Sick,
            LeaveCategory::Annual => Self::Annual,
            LeaveCategory::Parental => Self::Parental,
        }
    }
}

impl From<leave::LeaveStatus> for LeaveStatus {
    fn from(value: leave::LeaveStatus) -> Self {
        match value {
            leave::LeaveStatus::Pending => Self::Pending,
            leave::LeaveStatus::Processing => Self::Processing,
            leave::LeaveStatus::Approved => Self::Approved,
            leave::LeaveStatus::Denied => Self::Denied,
        }
    }
}

impl From<LeaveStatus> for leave::LeaveStatus {
    fn from(value: LeaveStatus) -> Self {
        match value {
            LeaveStatus::Pending => Self::Pending,
            LeaveStatus::Processing => Self::Processing,
            LeaveStatus::Approved => Self::Approved,
            LeaveStatus::Denied => Self::Denied,
        }
    }
}
