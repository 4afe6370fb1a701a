//! Leave domain types.
//!
//! This module defines the categories, statuses and request records that the
//! ledger, the state machine and the stores share.

use chrono::{DateTime, NaiveDate, Utc};
use hrm_shared::types::{EmployeeId, LeaveRequestId, OrganizationId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ledger::LeaveBalances;

/// Leave category. The set is fixed; each category owns one balance slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveCategory {
    /// Casual leave.
    Casual,
    /// Sick leave.
    Sick,
    /// Annual leave.
    Annual,
    /// Parental leave.
    Parental,
}

impl LeaveCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 4] = [Self::Casual, Self::Sick, Self::Annual, Self::Parental];

    /// Returns the string representation of the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Casual => "casual",
            Self::Sick => "sick",
            Self::Annual => "annual",
            Self::Parental => "parental",
        }
    }

    /// Human-readable label used by list views.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Casual => "Casual Leave",
            Self::Sick => "Sick Leave",
            Self::Annual => "Annual Leave",
            Self::Parental => "Parental Leave",
        }
    }

    /// Parses a category from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "casual" => Some(Self::Casual),
            "sick" => Some(Self::Sick),
            "annual" => Some(Self::Annual),
            "parental" => Some(Self::Parental),
            _ => None,
        }
    }
}

impl fmt::Display for LeaveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Leave request status.
///
/// Reviewers may move a request between any two statuses. Only `Denied`
/// is refunded; every other status holds the request's days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LeaveStatus {
    /// Submitted and waiting for review.
    Pending,
    /// Picked up by a reviewer.
    Processing,
    /// Approved.
    Approved,
    /// Denied; the request's days are back on the balance.
    Denied,
}

impl LeaveStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Processing,
        Self::Approved,
        Self::Denied,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Approved => "APPROVED",
            Self::Denied => "DENIED",
        }
    }

    /// Parses a status from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "PROCESSING" => Some(Self::Processing),
            "APPROVED" => Some(Self::Approved),
            "DENIED" => Some(Self::Denied),
            _ => None,
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Attachment metadata. The content itself lives in external blob storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Original file name.
    pub name: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Opaque reference into blob storage.
    pub content_ref: String,
}

/// A persisted leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Request ID.
    pub id: LeaveRequestId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Requesting employee.
    pub employee_id: EmployeeId,
    /// Leave category charged.
    pub category: LeaveCategory,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Days charged, frozen at submission.
    pub total_days: Decimal,
    /// Current status.
    pub status: LeaveStatus,
    /// Reason given by the requester.
    pub reason: String,
    /// Optional note from the requester.
    pub note: Option<String>,
    /// Attachment metadata.
    pub attachments: Vec<Attachment>,
    /// Last reviewer.
    pub reviewed_by: Option<UserId>,
    /// Last review time.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Note left by the last reviewer.
    pub review_note: Option<String>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Input for submitting a leave request.
#[derive(Debug, Clone)]
pub struct SubmitLeaveInput {
    /// Caller's organization.
    pub organization_id: OrganizationId,
    /// Employee requesting leave.
    pub employee_id: EmployeeId,
    /// Caller-chosen ID that makes retries idempotent.
    pub request_id: Option<LeaveRequestId>,
    /// Category to charge.
    pub category: LeaveCategory,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Reason for the leave.
    pub reason: String,
    /// Optional free-form note.
    pub note: Option<String>,
    /// Attachment metadata.
    pub attachments: Vec<Attachment>,
}

/// Input for a reviewer status change.
#[derive(Debug, Clone)]
pub struct ChangeStatusInput {
    /// Caller's organization.
    pub organization_id: OrganizationId,
    /// Request to update.
    pub request_id: LeaveRequestId,
    /// Reviewer performing the change.
    pub reviewer_id: UserId,
    /// Target status.
    pub new_status: LeaveStatus,
    /// Optional reviewer note.
    pub note: Option<String>,
}

/// Input for opening an employee's leave account.
#[derive(Debug, Clone)]
pub struct OpenAccountInput {
    /// Organization the employee belongs to.
    pub organization_id: OrganizationId,
    /// Employee the account belongs to.
    pub employee_id: EmployeeId,
    /// Display name.
    pub employee_name: String,
    /// Employee code shown next to the name.
    pub employee_code: String,
    /// Opening balances.
    pub opening: LeaveBalances,
}
