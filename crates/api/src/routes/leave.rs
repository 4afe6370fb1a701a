//! Leave account and request routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::NaiveDate;
use hrm_core::leave::{
    Attachment, ChangeStatusInput, EmployeeLeaveSummary, LeaveAccount, LeaveBalances,
    LeaveCategory, LeaveError, LeaveFilter, LeaveRequest, LeaveRequestView, LeaveSort,
    LeaveStatus, OpenAccountInput, SortOrder, SubmitLeaveInput,
};
use hrm_shared::AppError;
use hrm_shared::types::{EmployeeId, LeaveRequestId, PageRequest, PageResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the leave routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/leave/accounts", post(open_account))
        .route("/leave/accounts/{employee_id}", get(get_balances))
        .route("/leave/accounts/{employee_id}/summary", get(get_summary))
        .route("/leave/requests", post(submit_request).get(list_requests))
        .route("/leave/requests/{request_id}", get(get_request))
        .route("/leave/requests/{request_id}/status", put(change_status))
}

/// Request body for opening a leave account.
#[derive(Debug, Deserialize)]
pub struct OpenAccountRequest {
    /// Employee the account belongs to.
    pub employee_id: EmployeeId,
    /// Employee display name.
    pub employee_name: String,
    /// Employee code.
    pub employee_code: String,
    /// Opening balances; omitted categories start at zero.
    #[serde(default)]
    pub opening: LeaveBalances,
}

/// Balances of one employee.
#[derive(Debug, Serialize)]
pub struct BalancesResponse {
    /// Employee ID.
    pub employee_id: EmployeeId,
    /// Current balances.
    pub balances: LeaveBalances,
}

/// Request body for submitting leave.
#[derive(Debug, Deserialize)]
pub struct SubmitLeaveRequest {
    /// Client-chosen id that makes retries safe.
    pub request_id: Option<LeaveRequestId>,
    /// Leave category.
    pub category: LeaveCategory,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Reason for the leave.
    pub reason: String,
    /// Optional note from the requester.
    pub note: Option<String>,
    /// Attachment metadata.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    /// Target status.
    pub status: String,
    /// Optional reviewer note.
    pub note: Option<String>,
}

/// Query parameters for listing requests.
#[derive(Debug, Default, Deserialize)]
pub struct ListRequestsQuery {
    /// Filter by employee (reviewers only).
    pub employee_id: Option<EmployeeId>,
    /// Filter by status, case-insensitive.
    pub status: Option<String>,
    /// Filter by category, case-insensitive.
    pub category: Option<String>,
    /// Overlap window start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Overlap window end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Search on employee name or code.
    pub search: Option<String>,
    /// Sort key.
    pub sort: Option<LeaveSort>,
    /// Sort direction.
    pub order: Option<SortOrder>,
    /// Page number (1-indexed, default: 1).
    pub page: Option<u32>,
    /// Items per page (default: 20, max: 100).
    pub per_page: Option<u32>,
}

impl ListRequestsQuery {
    fn into_filter(self) -> Result<LeaveFilter, AppError> {
        let status = self
            .status
            .map(|s| {
                LeaveStatus::parse(&s)
                    .ok_or_else(|| AppError::Validation(format!("unknown leave status '{s}'")))
            })
            .transpose()?;
        let category = self
            .category
            .map(|c| {
                LeaveCategory::parse(&c)
                    .ok_or_else(|| AppError::Validation(format!("unknown leave category '{c}'")))
            })
            .transpose()?;
        let defaults = PageRequest::default();
        Ok(LeaveFilter {
            employee_id: self.employee_id,
            status,
            category,
            from: self.from,
            to: self.to,
            search: self.search,
            sort: self.sort.unwrap_or_default(),
            order: self.order.unwrap_or_default(),
            page: PageRequest::new(
                self.page.unwrap_or(defaults.page),
                self.per_page.unwrap_or(defaults.per_page),
            ),
        })
    }
}

/// POST `/leave/accounts` - Open a leave account (reviewers only).
async fn open_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<OpenAccountRequest>,
) -> ApiResult<(StatusCode, Json<LeaveAccount>)> {
    auth.require_reviewer()?;
    let account = state
        .coordinator
        .open_account(OpenAccountInput {
            organization_id: auth.organization_id(),
            employee_id: body.employee_id,
            employee_name: body.employee_name,
            employee_code: body.employee_code,
            opening: body.opening,
        })
        .await?;
    info!(employee_id = %account.employee_id, opened_by = %auth.user_id(), "Leave account opened via API");
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET `/leave/accounts/{employee_id}` - Current balances.
async fn get_balances(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(employee_id): Path<EmployeeId>,
) -> ApiResult<Json<BalancesResponse>> {
    auth.require_self_or_reviewer(employee_id)?;
    let balances = state
        .coordinator
        .get_balances(auth.organization_id(), employee_id)
        .await?;
    Ok(Json(BalancesResponse {
        employee_id,
        balances,
    }))
}

/// GET `/leave/accounts/{employee_id}/summary` - Balances with request counts.
async fn get_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(employee_id): Path<EmployeeId>,
) -> ApiResult<Json<EmployeeLeaveSummary>> {
    auth.require_self_or_reviewer(employee_id)?;
    let summary = state
        .queries
        .employee_summary(auth.organization_id(), employee_id)
        .await?;
    Ok(Json(summary))
}

/// POST `/leave/requests` - Submit leave for the caller's own employee record.
async fn submit_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<SubmitLeaveRequest>,
) -> ApiResult<(StatusCode, Json<LeaveRequest>)> {
    let employee_id = auth.require_employee()?;
    let request = state
        .coordinator
        .submit(SubmitLeaveInput {
            organization_id: auth.organization_id(),
            employee_id,
            request_id: body.request_id,
            category: body.category,
            start_date: body.start_date,
            end_date: body.end_date,
            reason: body.reason,
            note: body.note,
            attachments: body.attachments,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET `/leave/requests` - List requests; non-reviewers only see their own.
async fn list_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListRequestsQuery>,
) -> ApiResult<Json<PageResponse<LeaveRequestView>>> {
    let mut filter = query.into_filter()?;
    if !auth.is_reviewer() {
        filter.employee_id = Some(auth.require_employee()?);
    }
    let page = state
        .queries
        .list_requests(auth.organization_id(), &filter)
        .await?;
    Ok(Json(page))
}

/// GET `/leave/requests/{request_id}` - One request with its employee context.
async fn get_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<LeaveRequestId>,
) -> ApiResult<Json<LeaveRequestView>> {
    let view = state
        .queries
        .get_request(auth.organization_id(), request_id)
        .await?;
    if !auth.is_reviewer() && auth.employee_id() != Some(view.request.employee_id) {
        return Err(LeaveError::RequestNotFound(request_id).into());
    }
    Ok(Json(view))
}

/// PUT `/leave/requests/{request_id}/status` - Review a request (reviewers only).
async fn change_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<LeaveRequestId>,
    Json(body): Json<ChangeStatusRequest>,
) -> ApiResult<Json<LeaveRequest>> {
    auth.require_reviewer()?;
    let new_status = LeaveStatus::parse(&body.status)
        .ok_or_else(|| AppError::Validation(format!("unknown leave status '{}'", body.status)))?;
    let request = state
        .coordinator
        .change_status(ChangeStatusInput {
            organization_id: auth.organization_id(),
            request_id,
            reviewer_id: auth.user_id(),
            new_status,
            note: body.note,
        })
        .await?;
    Ok(Json(request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("approved"), Some(LeaveStatus::Approved))]
    #[case(Some("PENDING"), Some(LeaveStatus::Pending))]
    #[case(None, None)]
    fn test_status_filter_parsing(#[case] raw: Option<&str>, #[case] expected: Option<LeaveStatus>) {
        let query = ListRequestsQuery {
            status: raw.map(String::from),
            ..ListRequestsQuery::default()
        };
        assert_eq!(query.into_filter().unwrap().status, expected);
    }

    #[test]
    fn test_unknown_filter_values_are_rejected() {
        let query = ListRequestsQuery {
            category: Some("sabbatical".into()),
            ..ListRequestsQuery::default()
        };
        assert!(matches!(query.into_filter(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_page_is_clamped() {
        let query = ListRequestsQuery {
            page: Some(0),
            per_page: Some(10_000),
            ..ListRequestsQuery::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.page.page, 1);
        assert_eq!(filter.page.per_page, hrm_shared::types::MAX_PER_PAGE);
    }
}
