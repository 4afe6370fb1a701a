//! Leave balance ledger and request lifecycle.
//!
//! # Modules
//!
//! - `types` - Categories, statuses, requests and operation inputs
//! - `error` - Leave-specific error types
//! - `day_count` - Date range to charged days
//! - `ledger` - Per-employee balances
//! - `state_machine` - Transitions and their ledger effect
//! - `rules` - Submission validation
//! - `store` - Unit-of-work traits implemented by storage backends
//! - `memory` - In-process store
//! - `coordinator` - The only writer of balances
//! - `projection` - Read-only lists and summaries

pub mod coordinator;
pub mod day_count;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod projection;
pub mod rules;
pub mod state_machine;
pub mod store;
pub mod types;

#[cfg(test)]
mod coordinator_props;
#[cfg(test)]
mod state_machine_props;

pub use coordinator::LeaveCoordinator;
pub use day_count::{DayCountPolicy, InclusiveCalendarDays};
pub use error::LeaveError;
pub use ledger::{BALANCE_SCALE, LeaveAccount, LeaveBalances, MAX_BALANCE};
pub use memory::MemoryLeaveStore;
pub use projection::{
    EmployeeLeaveSummary, LeaveFilter, LeaveQueryService, LeaveReadModel, LeaveRequestView,
    LeaveSort, SortOrder, StatusCounts,
};
pub use rules::LeaveRules;
pub use state_machine::{BalanceEffect, LeaveStateMachine, LeaveTransition, is_refunded};
pub use store::{LeaveStore, LeaveUnitOfWork};
pub use types::{
    Attachment, ChangeStatusInput, LeaveCategory, LeaveRequest, LeaveStatus, OpenAccountInput,
    SubmitLeaveInput,
};
