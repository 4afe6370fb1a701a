//! Per-employee leave balances.
//!
//! A [`LeaveAccount`] is the single source of truth for how many days an
//! employee may still take in each category. Balances are decimals and are
//! never allowed to go negative.

use chrono::{DateTime, Utc};
use hrm_shared::types::{EmployeeId, OrganizationId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LeaveError;
use super::types::LeaveCategory;

/// Decimal places a stored balance may carry.
pub const BALANCE_SCALE: u32 = 2;

/// Largest balance a category can hold (`NUMERIC(7,2)`).
pub const MAX_BALANCE: Decimal = Decimal::from_parts(9_999_999, 0, 0, false, BALANCE_SCALE);

/// One balance per category. Categories missing from input default to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaveBalances {
    /// Casual leave days.
    pub casual: Decimal,
    /// Sick leave days.
    pub sick: Decimal,
    /// Annual leave days.
    pub annual: Decimal,
    /// Parental leave days.
    pub parental: Decimal,
}

impl LeaveBalances {
    /// Returns the balance for a category.
    #[must_use]
    pub const fn get(&self, category: LeaveCategory) -> Decimal {
        match category {
            LeaveCategory::Casual => self.casual,
            LeaveCategory::Sick => self.sick,
            LeaveCategory::Annual => self.annual,
            LeaveCategory::Parental => self.parental,
        }
    }

    /// Overwrites the balance for a category.
    pub fn set(&mut self, category: LeaveCategory, value: Decimal) {
        match category {
            LeaveCategory::Casual => self.casual = value,
            LeaveCategory::Sick => self.sick = value,
            LeaveCategory::Annual => self.annual = value,
            LeaveCategory::Parental => self.parental = value,
        }
    }

    /// Returns the first category holding a negative balance, if any.
    #[must_use]
    pub fn first_negative(&self) -> Option<LeaveCategory> {
        LeaveCategory::ALL
            .into_iter()
            .find(|c| self.get(*c) < Decimal::ZERO)
    }
}

/// Whether a day amount fits a balance column.
#[must_use]
pub fn is_storable(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= MAX_BALANCE && value.normalize().scale() <= BALANCE_SCALE
}

/// An employee's leave account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveAccount {
    /// Employee the account belongs to.
    pub employee_id: EmployeeId,
    /// Employee's organization.
    pub organization_id: OrganizationId,
    /// Display name.
    pub employee_name: String,
    /// Employee code.
    pub employee_code: String,
    /// Current balances.
    pub balances: LeaveBalances,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last balance change.
    pub updated_at: DateTime<Utc>,
}

impl LeaveAccount {
    /// Returns the current balance for a category.
    #[must_use]
    pub const fn balance(&self, category: LeaveCategory) -> Decimal {
        self.balances.get(category)
    }

    /// Applies a signed delta to one category and returns the new balance.
    ///
    /// Positive deltas credit, negative deltas debit. A debit that would
    /// leave the balance negative fails and leaves the account untouched.
    pub fn adjust(&mut self, category: LeaveCategory, delta: Decimal) -> Result<Decimal, LeaveError> {
        let available = self.balance(category);
        let next = available + delta;
        if next < Decimal::ZERO {
            return Err(LeaveError::InsufficientBalance {
                category,
                available,
                requested: -delta,
            });
        }
        self.balances.set(category, next);
        Ok(next)
    }

    /// Fails with `Forbidden` when the account belongs to another organization.
    pub fn ensure_organization(&self, organization_id: OrganizationId) -> Result<(), LeaveError> {
        if self.organization_id == organization_id {
            Ok(())
        } else {
            Err(LeaveError::Forbidden(format!(
                "employee {} belongs to another organization",
                self.employee_id
            )))
        }
    }
}
