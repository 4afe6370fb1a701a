//! Leave error types.

use chrono::NaiveDate;
use hrm_shared::AppError;
use hrm_shared::types::{EmployeeId, LeaveRequestId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::LeaveCategory;

/// Errors raised by leave operations.
///
/// All variants are terminal. Nothing is retried locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaveError {
    /// The end date is before the start date.
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidRange {
        /// Requested start date.
        start: NaiveDate,
        /// Requested end date.
        end: NaiveDate,
    },

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No leave account exists for the employee.
    #[error("Leave account for employee {0} not found")]
    AccountNotFound(EmployeeId),

    /// A leave account already exists for the employee.
    #[error("Leave account for employee {0} already exists")]
    DuplicateAccount(EmployeeId),

    /// The balance cannot cover the requested days.
    #[error("Insufficient {category} balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Category charged.
        category: LeaveCategory,
        /// Balance at the time of the check.
        available: Decimal,
        /// Days that would have been debited.
        requested: Decimal,
    },

    /// The request does not exist or is outside the caller's organization.
    #[error("Leave request {0} not found")]
    RequestNotFound(LeaveRequestId),

    /// The account belongs to another organization.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// The store is unavailable or rejected the unit of work.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LeaveError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Forbidden(_) => 403,
            Self::AccountNotFound(_) | Self::RequestNotFound(_) => 404,
            Self::DuplicateAccount(_) => 409,
            Self::InvalidRange { .. } | Self::InsufficientBalance { .. } => 422,
            Self::Storage(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRange { .. } => "INVALID_RANGE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::DuplicateAccount(_) => "DUPLICATE_ACCOUNT",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::RequestNotFound(_) => "REQUEST_NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<LeaveError> for AppError {
    fn from(err: LeaveError) -> Self {
        let message = err.to_string();
        match err {
            LeaveError::Validation(m) => Self::Validation(m),
            LeaveError::InvalidRange { .. } | LeaveError::InsufficientBalance { .. } => {
                Self::BusinessRule {
                    code: err.error_code(),
                    message,
                }
            }
            LeaveError::AccountNotFound(_) | LeaveError::RequestNotFound(_) => {
                Self::NotFound(message)
            }
            LeaveError::DuplicateAccount(_) => Self::Conflict(message),
            LeaveError::Forbidden(m) => Self::Forbidden(m),
            LeaveError::Storage(m) => Self::Database(m),
        }
    }
}
