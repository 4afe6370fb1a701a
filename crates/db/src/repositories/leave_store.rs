//! PostgreSQL leave store.
//!
//! A unit of work is one database transaction. `lock_account` takes a
//! `SELECT ... FOR UPDATE` on the account row, which serializes every
//! category of that employee until the transaction ends. Dropping a unit
//! without committing drops the transaction, which rolls it back.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use hrm_core::leave::{
    LeaveAccount, LeaveCategory, LeaveError, LeaveRequest, LeaveStore, LeaveUnitOfWork,
};
use hrm_shared::types::{EmployeeId, LeaveRequestId, UserId};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, error};

use super::leave_mapping::{
    account_from_model, account_insert_error, account_to_active, balance_column,
    request_from_model, request_insert_error, request_to_active, storage,
};
use crate::entities::{leave_accounts, leave_requests};

/// Leave store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct LeaveRepository {
    db: DatabaseConnection,
}

impl LeaveRepository {
    /// Creates a new leave repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LeaveStore for LeaveRepository {
    async fn begin(&self) -> Result<Box<dyn LeaveUnitOfWork>, LeaveError> {
        let txn = self.db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to open leave transaction");
            storage(e)
        })?;
        Ok(Box::new(PgUnitOfWork { txn: Some(txn) }))
    }

    async fn find_account(&self, employee_id: EmployeeId) -> Result<Option<LeaveAccount>, LeaveError> {
        let model = leave_accounts::Entity::find_by_id(employee_id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?;
        Ok(model.map(account_from_model))
    }

    async fn find_request(&self, request_id: LeaveRequestId) -> Result<Option<LeaveRequest>, LeaveError> {
        leave_requests::Entity::find_by_id(request_id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?
            .map(request_from_model)
            .transpose()
    }
}

struct PgUnitOfWork {
    txn: Option<DatabaseTransaction>,
}

impl PgUnitOfWork {
    fn txn(&self) -> Result<&DatabaseTransaction, LeaveError> {
        self.txn
            .as_ref()
            .ok_or_else(|| LeaveError::Storage("unit of work already committed".into()))
    }
}

#[async_trait]
impl LeaveUnitOfWork for PgUnitOfWork {
    async fn lock_account(
        &mut self,
        employee_id: EmployeeId,
        category: LeaveCategory,
    ) -> Result<Option<LeaveAccount>, LeaveError> {
        debug!(employee_id = %employee_id, category = %category, "Locking leave account");
        let model = leave_accounts::Entity::find_by_id(employee_id.into_inner())
            .lock_exclusive()
            .one(self.txn()?)
            .await
            .map_err(storage)?;
        Ok(model.map(account_from_model))
    }

    async fn find_request(&mut self, request_id: LeaveRequestId) -> Result<Option<LeaveRequest>, LeaveError> {
        leave_requests::Entity::find_by_id(request_id.into_inner())
            .one(self.txn()?)
            .await
            .map_err(storage)?
            .map(request_from_model)
            .transpose()
    }

    async fn insert_account(&mut self, account: &LeaveAccount) -> Result<(), LeaveError> {
        account_to_active(account)
            .insert(self.txn()?)
            .await
            .map_err(|e| account_insert_error(account.employee_id, e))?;
        Ok(())
    }

    async fn write_balance(
        &mut self,
        employee_id: EmployeeId,
        category: LeaveCategory,
        balance: Decimal,
    ) -> Result<(), LeaveError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let result = leave_accounts::Entity::update_many()
            .col_expr(balance_column(category), Expr::val(balance).into())
            .col_expr(leave_accounts::Column::UpdatedAt, Expr::val(now).into())
            .filter(leave_accounts::Column::EmployeeId.eq(employee_id.into_inner()))
            .exec(self.txn()?)
            .await
            .map_err(storage)?;
        if result.rows_affected == 0 {
            return Err(LeaveError::AccountNotFound(employee_id));
        }
        Ok(())
    }

    async fn insert_request(&mut self, request: &LeaveRequest) -> Result<(), LeaveError> {
        request_to_active(request)?
            .insert(self.txn()?)
            .await
            .map_err(|e| request_insert_error(request.id, e))?;
        Ok(())
    }

    async fn update_request(&mut self, request: &LeaveRequest) -> Result<(), LeaveError> {
        let active = leave_requests::ActiveModel {
            id: Unchanged(request.id.into_inner()),
            status: Set(request.status.into()),
            reviewed_by: Set(request.reviewed_by.map(UserId::into_inner)),
            reviewed_at: Set(request.reviewed_at.map(Into::into)),
            review_note: Set(request.review_note.clone()),
            updated_at: Set(request.updated_at.into()),
            ..Default::default()
        };
        match active.update(self.txn()?).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(LeaveError::RequestNotFound(request.id)),
            Err(e) => Err(storage(e)),
        }
    }

    async fn commit(&mut self) -> Result<(), LeaveError> {
        let txn = self
            .txn
            .take()
            .ok_or_else(|| LeaveError::Storage("unit of work already committed".into()))?;
        txn.commit().await.map_err(|e| {
            error!(error = %e, "Failed to commit leave transaction");
            storage(e)
        })
    }
}
