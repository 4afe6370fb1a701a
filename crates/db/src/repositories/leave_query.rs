//! Read-only leave queries for list and summary views.

use std::collections::HashMap;

use async_trait::async_trait;
use hrm_core::leave::{
    EmployeeLeaveSummary, LeaveError, LeaveFilter, LeaveReadModel, LeaveRequestView, LeaveSort,
    SortOrder,
};
use hrm_shared::types::{EmployeeId, LeaveRequestId, OrganizationId, PageResponse};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    AccessMode, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IsolationLevel, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Select, TransactionTrait,
};
use uuid::Uuid;

use super::leave_mapping::{account_from_model, request_from_model, storage};
use crate::entities::sea_orm_active_enums::{LeaveCategory, LeaveStatus};
use crate::entities::{leave_accounts, leave_requests};

/// Escapes `LIKE` wildcards in user input.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Leave query repository.
#[derive(Debug, Clone)]
pub struct LeaveQueryRepository {
    db: DatabaseConnection,
}

impl LeaveQueryRepository {
    /// Creates a new leave query repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Base query with every filter applied, joined to the owning account.
    fn filtered(organization_id: OrganizationId, filter: &LeaveFilter) -> Select<leave_requests::Entity> {
        let mut query = leave_requests::Entity::find()
            .inner_join(leave_accounts::Entity)
            .filter(leave_requests::Column::OrganizationId.eq(organization_id.into_inner()));

        if let Some(employee_id) = filter.employee_id {
            query = query.filter(leave_requests::Column::EmployeeId.eq(employee_id.into_inner()));
        }
        if let Some(status) = filter.status {
            query = query.filter(leave_requests::Column::Status.eq(LeaveStatus::from(status)));
        }
        if let Some(category) = filter.category {
            query = query.filter(leave_requests::Column::Category.eq(LeaveCategory::from(category)));
        }
        // Overlap with the requested window.
        if let Some(from) = filter.from {
            query = query.filter(leave_requests::Column::EndDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(leave_requests::Column::StartDate.lte(to));
        }
        if let Some(search) = &filter.search {
            let pattern = like_pattern(&search.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            leave_accounts::Entity,
                            leave_accounts::Column::EmployeeName,
                        ))))
                        .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            leave_accounts::Entity,
                            leave_accounts::Column::EmployeeCode,
                        ))))
                        .like(pattern),
                    ),
            );
        }
        query
    }

    /// Opens a read-only snapshot so that multi-statement reads agree.
    async fn snapshot(&self) -> Result<DatabaseTransaction, LeaveError> {
        self.db
            .begin_with_config(Some(IsolationLevel::RepeatableRead), Some(AccessMode::ReadOnly))
            .await
            .map_err(storage)
    }

    async fn accounts_by_id<C: ConnectionTrait>(
        db: &C,
        ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, hrm_core::leave::LeaveAccount>, LeaveError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let accounts = leave_accounts::Entity::find()
            .filter(leave_accounts::Column::EmployeeId.is_in(ids))
            .all(db)
            .await
            .map_err(storage)?;
        Ok(accounts
            .into_iter()
            .map(|m| (m.employee_id, account_from_model(m)))
            .collect())
    }
}

#[async_trait]
impl LeaveReadModel for LeaveQueryRepository {
    async fn list_requests(
        &self,
        organization_id: OrganizationId,
        filter: &LeaveFilter,
    ) -> Result<PageResponse<LeaveRequestView>, LeaveError> {
        let txn = self.snapshot().await?;
        let query = Self::filtered(organization_id, filter);
        let total = query.clone().count(&txn).await.map_err(storage)?;

        let order = match filter.order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };
        let column = match filter.sort {
            LeaveSort::SubmittedAt => leave_requests::Column::CreatedAt,
            LeaveSort::StartDate => leave_requests::Column::StartDate,
            LeaveSort::Category => leave_requests::Column::Category,
            LeaveSort::Status => leave_requests::Column::Status,
        };

        let rows = query
            .order_by(column, order.clone())
            .order_by(leave_requests::Column::Id, order)
            .offset(filter.page.offset())
            .limit(filter.page.limit())
            .all(&txn)
            .await
            .map_err(storage)?;

        let mut ids: Vec<Uuid> = rows.iter().map(|r| r.employee_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let accounts = Self::accounts_by_id(&txn, ids).await?;
        txn.commit().await.map_err(storage)?;

        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            let account = accounts.get(&row.employee_id).ok_or_else(|| {
                LeaveError::Storage(format!("leave request {} has no account", row.id))
            })?;
            data.push(LeaveRequestView::new(request_from_model(row)?, account));
        }

        Ok(PageResponse::new(data, filter.page.page, filter.page.per_page, total))
    }

    async fn get_request(
        &self,
        organization_id: OrganizationId,
        request_id: LeaveRequestId,
    ) -> Result<Option<LeaveRequestView>, LeaveError> {
        let Some((row, account)) = leave_requests::Entity::find_by_id(request_id.into_inner())
            .filter(leave_requests::Column::OrganizationId.eq(organization_id.into_inner()))
            .find_also_related(leave_accounts::Entity)
            .one(&self.db)
            .await
            .map_err(storage)?
        else {
            return Ok(None);
        };
        let account = account.map(account_from_model).ok_or_else(|| {
            LeaveError::Storage(format!("leave request {request_id} has no account"))
        })?;
        Ok(Some(LeaveRequestView::new(request_from_model(row)?, &account)))
    }

    async fn employee_summary(
        &self,
        organization_id: OrganizationId,
        employee_id: EmployeeId,
    ) -> Result<Option<EmployeeLeaveSummary>, LeaveError> {
        let txn = self.snapshot().await?;
        let Some(account) = leave_accounts::Entity::find_by_id(employee_id.into_inner())
            .filter(leave_accounts::Column::OrganizationId.eq(organization_id.into_inner()))
            .one(&txn)
            .await
            .map_err(storage)?
        else {
            return Ok(None);
        };
        let requests = leave_requests::Entity::find()
            .filter(leave_requests::Column::EmployeeId.eq(employee_id.into_inner()))
            .all(&txn)
            .await
            .map_err(storage)?
            .into_iter()
            .map(request_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        txn.commit().await.map_err(storage)?;
        Ok(Some(EmployeeLeaveSummary::build(
            &account_from_model(account),
            &requests,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("tanvir", "%tanvir%")]
    #[case("50%", "%50\\%%")]
    #[case("eng_04", "%eng\\_04%")]
    #[case("a\\b", "%a\\\\b%")]
    fn test_like_pattern_escapes_wildcards(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(like_pattern(input), expected);
    }
}
