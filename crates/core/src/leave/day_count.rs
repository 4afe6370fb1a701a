//! Day-count policies.
//!
//! A policy turns a date range into the number of days charged against a
//! balance. The count is taken once at submission and frozen on the request.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::LeaveError;

/// Converts a date range into charged days.
pub trait DayCountPolicy: Send + Sync {
    /// Returns the number of days charged for `start..=end`.
    ///
    /// Implementations must fail with `InvalidRange` when `end < start` and
    /// must otherwise return a positive amount.
    fn charged_days(&self, start: NaiveDate, end: NaiveDate) -> Result<Decimal, LeaveError>;
}

/// Counts every calendar day in the range, both ends included.
#[derive(Debug, Clone, Copy, Default)]
pub struct InclusiveCalendarDays;

impl DayCountPolicy for InclusiveCalendarDays {
    fn charged_days(&self, start: NaiveDate, end: NaiveDate) -> Result<Decimal, LeaveError> {
        if end < start {
            return Err(LeaveError::InvalidRange { start, end });
        }
        let days = (end - start).num_days() + 1;
        Ok(Decimal::from(days))
    }
}
