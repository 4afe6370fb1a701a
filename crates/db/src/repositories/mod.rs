//! Repository implementations of the leave store and read model.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

mod leave_mapping;
pub mod leave_query;
pub mod leave_store;

pub use leave_query::LeaveQueryRepository;
pub use leave_store::LeaveRepository;
