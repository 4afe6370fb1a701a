//! Read-only projections over leave requests.
//!
//! Nothing here writes. Views pair each request with the employee's
//! *current* balances, so a list always shows what is left right now rather
//! than what was left at submission.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use hrm_shared::types::{EmployeeId, LeaveRequestId, OrganizationId, PageRequest, PageResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LeaveError;
use super::ledger::{LeaveAccount, LeaveBalances};
use super::state_machine::is_refunded;
use super::types::{LeaveCategory, LeaveRequest, LeaveStatus};

/// Sort key for request lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveSort {
    /// Submission time.
    #[default]
    SubmittedAt,
    /// First day of leave.
    StartDate,
    /// Leave category.
    Category,
    /// Request status.
    Status,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

/// Filter, sort and page for request lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveFilter {
    /// Only this employee's requests.
    pub employee_id: Option<EmployeeId>,
    /// Only requests in this status.
    pub status: Option<LeaveStatus>,
    /// Only requests in this category.
    pub category: Option<LeaveCategory>,
    /// Requests overlapping a window starting on this day.
    pub from: Option<NaiveDate>,
    /// Requests overlapping a window ending on this day.
    pub to: Option<NaiveDate>,
    /// Case-insensitive match on employee name or code.
    pub search: Option<String>,
    /// Sort key.
    pub sort: LeaveSort,
    /// Sort direction.
    pub order: SortOrder,
    /// Page to return.
    pub page: PageRequest,
}

impl LeaveFilter {
    /// Returns a copy with a clamped page and a trimmed, lower-cased search
    /// term (dropped when blank).
    #[must_use]
    pub fn normalized(&self) -> Self {
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        Self {
            search,
            page: self.page.normalized(),
            ..self.clone()
        }
    }

    /// Whether a request, together with its account, passes the filter.
    ///
    /// Expects a normalized filter.
    #[must_use]
    pub fn matches(&self, request: &LeaveRequest, account: &LeaveAccount) -> bool {
        if self.employee_id.is_some_and(|id| id != request.employee_id) {
            return false;
        }
        if self.status.is_some_and(|s| s != request.status) {
            return false;
        }
        if self.category.is_some_and(|c| c != request.category) {
            return false;
        }
        if self.from.is_some_and(|from| request.end_date < from) {
            return false;
        }
        if self.to.is_some_and(|to| request.start_date > to) {
            return false;
        }
        match &self.search {
            Some(needle) => {
                account.employee_name.to_lowercase().contains(needle.as_str())
                    || account.employee_code.to_lowercase().contains(needle.as_str())
            }
            None => true,
        }
    }
}

/// A request as shown in lists and detail views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaveRequestView {
    /// The stored request.
    #[serde(flatten)]
    pub request: LeaveRequest,
    /// Human-readable category.
    pub category_label: &'static str,
    /// Employee display name.
    pub employee_name: String,
    /// Employee code.
    pub employee_code: String,
    /// Current balances of the employee.
    pub balances: LeaveBalances,
}

impl LeaveRequestView {
    /// Pairs a request with its account.
    #[must_use]
    pub fn new(request: LeaveRequest, account: &LeaveAccount) -> Self {
        Self {
            category_label: request.category.label(),
            request,
            employee_name: account.employee_name.clone(),
            employee_code: account.employee_code.clone(),
            balances: account.balances,
        }
    }
}

/// Sorts views in place. Ties break on request id.
pub fn sort_views(views: &mut [LeaveRequestView], sort: LeaveSort, order: SortOrder) {
    views.sort_by(|a, b| {
        let (a, b) = (&a.request, &b.request);
        let ord = match sort {
            LeaveSort::SubmittedAt => a.created_at.cmp(&b.created_at),
            LeaveSort::StartDate => a.start_date.cmp(&b.start_date),
            LeaveSort::Category => a.category.cmp(&b.category),
            LeaveSort::Status => a.status.cmp(&b.status),
        }
        .then_with(|| a.id.cmp(&b.id));
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

/// Cuts one page out of an already sorted list.
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: PageRequest) -> PageResponse<T> {
    let total = items.len() as u64;
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    let data = items.into_iter().skip(offset).take(limit).collect();
    PageResponse::new(data, page.page, page.per_page, total)
}

/// Request counts per status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusCounts {
    /// Pending requests.
    pub pending: u64,
    /// Requests being processed.
    pub processing: u64,
    /// Approved requests.
    pub approved: u64,
    /// Denied requests.
    pub denied: u64,
}

impl StatusCounts {
    fn record(&mut self, status: LeaveStatus) {
        match status {
            LeaveStatus::Pending => self.pending += 1,
            LeaveStatus::Processing => self.processing += 1,
            LeaveStatus::Approved => self.approved += 1,
            LeaveStatus::Denied => self.denied += 1,
        }
    }
}

/// Per-employee rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeLeaveSummary {
    /// Employee.
    pub employee_id: EmployeeId,
    /// Display name.
    pub employee_name: String,
    /// Employee code.
    pub employee_code: String,
    /// Current balances.
    pub balances: LeaveBalances,
    /// Request counts by status.
    pub requests: StatusCounts,
    /// Days held by requests that are not denied, per category.
    pub held_days: LeaveBalances,
}

impl EmployeeLeaveSummary {
    /// Builds the rollup from an account and all of its requests.
    #[must_use]
    pub fn build(account: &LeaveAccount, requests: &[LeaveRequest]) -> Self {
        let mut counts = StatusCounts::default();
        let mut held = LeaveBalances::default();
        for request in requests.iter().filter(|r| r.employee_id == account.employee_id) {
            counts.record(request.status);
            if !is_refunded(Some(request.status)) {
                let sum: Decimal = held.get(request.category) + request.total_days;
                held.set(request.category, sum);
            }
        }
        Self {
            employee_id: account.employee_id,
            employee_name: account.employee_name.clone(),
            employee_code: account.employee_code.clone(),
            balances: account.balances,
            requests: counts,
            held_days: held,
        }
    }
}

/// Read access used by the query service.
#[async_trait]
pub trait LeaveReadModel: Send + Sync {
    /// Lists requests of an organization. `filter` is already normalized.
    async fn list_requests(
        &self,
        organization_id: OrganizationId,
        filter: &LeaveFilter,
    ) -> Result<PageResponse<LeaveRequestView>, LeaveError>;

    /// Loads one request of an organization.
    async fn get_request(
        &self,
        organization_id: OrganizationId,
        request_id: LeaveRequestId,
    ) -> Result<Option<LeaveRequestView>, LeaveError>;

    /// Builds the rollup for one employee of an organization.
    async fn employee_summary(
        &self,
        organization_id: OrganizationId,
        employee_id: EmployeeId,
    ) -> Result<Option<EmployeeLeaveSummary>, LeaveError>;
}

/// Query front door. Scopes every read to the caller's organization.
#[derive(Clone)]
pub struct LeaveQueryService {
    read_model: Arc<dyn LeaveReadModel>,
}

impl LeaveQueryService {
    /// Creates a query service over a read model.
    #[must_use]
    pub fn new(read_model: Arc<dyn LeaveReadModel>) -> Self {
        Self { read_model }
    }

    /// Lists requests matching `filter`.
    pub async fn list_requests(
        &self,
        organization_id: OrganizationId,
        filter: &LeaveFilter,
    ) -> Result<PageResponse<LeaveRequestView>, LeaveError> {
        let filter = filter.normalized();
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if to < from {
                return Err(LeaveError::Validation(format!(
                    "date window ends ({to}) before it starts ({from})"
                )));
            }
        }
        self.read_model.list_requests(organization_id, &filter).await
    }

    /// Loads one request.
    pub async fn get_request(
        &self,
        organization_id: OrganizationId,
        request_id: LeaveRequestId,
    ) -> Result<LeaveRequestView, LeaveError> {
        self.read_model
            .get_request(organization_id, request_id)
            .await?
            .ok_or(LeaveError::RequestNotFound(request_id))
    }

    /// Builds the per-employee rollup.
    pub async fn employee_summary(
        &self,
        organization_id: OrganizationId,
        employee_id: EmployeeId,
    ) -> Result<EmployeeLeaveSummary, LeaveError> {
        self.read_model
            .employee_summary(organization_id, employee_id)
            .await?
            .ok_or(LeaveError::AccountNotFound(employee_id))
    }
}
