//! `SeaORM` entity definitions.

pub mod leave_accounts;
pub mod leave_requests;
pub mod sea_orm_active_enums;
