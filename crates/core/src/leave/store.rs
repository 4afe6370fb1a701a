//! Storage seams for the leave ledger.
//!
//! The coordinator talks to storage only through these traits. A store hands
//! out units of work; a unit stages reads and writes and makes them visible
//! together on [`LeaveUnitOfWork::commit`]. Dropping a unit without committing
//! discards everything it staged and releases its locks.
//!
//! Lock order inside a unit is always account first, then request.

use async_trait::async_trait;
use hrm_shared::types::{EmployeeId, LeaveRequestId};
use rust_decimal::Decimal;

use super::error::LeaveError;
use super::ledger::LeaveAccount;
use super::types::{LeaveCategory, LeaveRequest};

/// Entry point into a leave store.
#[async_trait]
pub trait LeaveStore: Send + Sync {
    /// Opens a new unit of work.
    async fn begin(&self) -> Result<Box<dyn LeaveUnitOfWork>, LeaveError>;

    /// Reads an account outside any unit of work.
    async fn find_account(&self, employee_id: EmployeeId) -> Result<Option<LeaveAccount>, LeaveError>;

    /// Reads a request outside any unit of work.
    async fn find_request(&self, request_id: LeaveRequestId) -> Result<Option<LeaveRequest>, LeaveError>;
}

/// One atomic batch of ledger and request writes.
#[async_trait]
pub trait LeaveUnitOfWork: Send {
    /// Locks the account's `category` balance for the rest of the unit and
    /// returns the account as of the lock.
    ///
    /// Stores may lock more than the one category.
    async fn lock_account(
        &mut self,
        employee_id: EmployeeId,
        category: LeaveCategory,
    ) -> Result<Option<LeaveAccount>, LeaveError>;

    /// Reads a request, including writes staged in this unit.
    async fn find_request(&mut self, request_id: LeaveRequestId) -> Result<Option<LeaveRequest>, LeaveError>;

    /// Stages a new account. Fails with `DuplicateAccount` if one exists.
    async fn insert_account(&mut self, account: &LeaveAccount) -> Result<(), LeaveError>;

    /// Stages a new balance for a category locked by this unit.
    async fn write_balance(
        &mut self,
        employee_id: EmployeeId,
        category: LeaveCategory,
        balance: Decimal,
    ) -> Result<(), LeaveError>;

    /// Stages a new request.
    async fn insert_request(&mut self, request: &LeaveRequest) -> Result<(), LeaveError>;

    /// Stages status and review fields of an existing request.
    async fn update_request(&mut self, request: &LeaveRequest) -> Result<(), LeaveError>;

    /// Makes every staged write visible at once.
    ///
    /// On error nothing is applied. A unit must not be used after commit.
    async fn commit(&mut self) -> Result<(), LeaveError>;
}
