//! Balance transaction coordinator.
//!
//! The coordinator is the only code that writes leave balances. Every
//! operation runs inside one unit of work: the affected balance is locked,
//! the state machine decides the effect, the ledger is adjusted and the
//! request written, then everything commits together. Any error before the
//! commit drops the unit and leaves storage untouched.

use std::sync::Arc;

use chrono::Utc;
use hrm_shared::types::{EmployeeId, OrganizationId};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::day_count::{DayCountPolicy, InclusiveCalendarDays};
use super::error::LeaveError;
use super::ledger::{LeaveAccount, LeaveBalances};
use super::rules::LeaveRules;
use super::state_machine::LeaveStateMachine;
use super::store::LeaveStore;
use super::types::{
    ChangeStatusInput, LeaveCategory, LeaveRequest, OpenAccountInput, SubmitLeaveInput,
};

/// Coordinates ledger and request writes.
#[derive(Clone)]
pub struct LeaveCoordinator {
    store: Arc<dyn LeaveStore>,
    day_count: Arc<dyn DayCountPolicy>,
    rules: LeaveRules,
}

impl LeaveCoordinator {
    /// Creates a coordinator with default rules and inclusive calendar-day
    /// counting.
    #[must_use]
    pub fn new(store: Arc<dyn LeaveStore>) -> Self {
        Self {
            store,
            day_count: Arc::new(InclusiveCalendarDays),
            rules: LeaveRules::default(),
        }
    }

    /// Replaces the submission rules.
    #[must_use]
    pub fn with_rules(mut self, rules: LeaveRules) -> Self {
        self.rules = rules;
        self
    }

    /// Replaces the day-count policy.
    #[must_use]
    pub fn with_day_count_policy(mut self, policy: Arc<dyn DayCountPolicy>) -> Self {
        self.day_count = policy;
        self
    }

    /// Opens a leave account with its opening balances.
    pub async fn open_account(&self, input: OpenAccountInput) -> Result<LeaveAccount, LeaveError> {
        LeaveRules::validate_opening(&input.opening)?;
        if input.employee_name.trim().is_empty() {
            return Err(LeaveError::Validation("employee name is required".into()));
        }

        let mut unit = self.store.begin().await?;
        if unit
            .lock_account(input.employee_id, LeaveCategory::Casual)
            .await?
            .is_some()
        {
            return Err(LeaveError::DuplicateAccount(input.employee_id));
        }

        let now = Utc::now();
        let account = LeaveAccount {
            employee_id: input.employee_id,
            organization_id: input.organization_id,
            employee_name: input.employee_name.trim().to_string(),
            employee_code: input.employee_code.trim().to_string(),
            balances: input.opening,
            created_at: now,
            updated_at: now,
        };
        unit.insert_account(&account).await?;
        unit.commit().await?;

        info!(
            employee_id = %account.employee_id,
            organization_id = %account.organization_id,
            "Leave account opened"
        );
        Ok(account)
    }

    /// Submits a leave request, debiting its days in the same unit of work.
    ///
    /// With a caller-supplied `request_id`, repeating the call returns the
    /// stored request instead of charging twice.
    pub async fn submit(&self, input: SubmitLeaveInput) -> Result<LeaveRequest, LeaveError> {
        self.rules.validate_submission(&input)?;
        let total_days = self.day_count.charged_days(input.start_date, input.end_date)?;
        LeaveRules::validate_charged_days(total_days)?;

        let mut unit = self.store.begin().await?;
        let mut account = unit
            .lock_account(input.employee_id, input.category)
            .await?
            .ok_or(LeaveError::AccountNotFound(input.employee_id))?;
        account.ensure_organization(input.organization_id)?;

        if let Some(request_id) = input.request_id {
            if let Some(existing) = unit.find_request(request_id).await? {
                if existing.employee_id != input.employee_id || existing.category != input.category {
                    return Err(LeaveError::Validation(format!(
                        "request id {request_id} is already used by another request"
                    )));
                }
                debug!(request_id = %request_id, "Leave submission replayed");
                return Ok(existing);
            }
        }

        let transition = LeaveStateMachine::submit(total_days);
        let balance = account.adjust(input.category, transition.effect.delta())?;
        unit.write_balance(input.employee_id, input.category, balance).await?;

        let request = LeaveRequest {
            id: input.request_id.unwrap_or_default(),
            organization_id: input.organization_id,
            employee_id: input.employee_id,
            category: input.category,
            start_date: input.start_date,
            end_date: input.end_date,
            total_days,
            status: transition.to,
            reason: input.reason.trim().to_string(),
            note: input.note,
            attachments: input.attachments,
            reviewed_by: None,
            reviewed_at: None,
            review_note: None,
            created_at: transition.at,
            updated_at: transition.at,
        };
        unit.insert_request(&request).await?;
        unit.commit().await?;

        info!(
            request_id = %request.id,
            employee_id = %request.employee_id,
            category = %request.category,
            total_days = %total_days,
            balance = %balance,
            "Leave request submitted"
        );
        Ok(request)
    }

    /// Moves a request to a new status on behalf of a reviewer, crediting or
    /// debiting the balance when the move crosses the denied boundary.
    pub async fn change_status(&self, input: ChangeStatusInput) -> Result<LeaveRequest, LeaveError> {
        // Unlocked read, only to learn which balance to lock.
        let located = self
            .store
            .find_request(input.request_id)
            .await?
            .filter(|r| r.organization_id == input.organization_id)
            .ok_or(LeaveError::RequestNotFound(input.request_id))?;

        let mut unit = self.store.begin().await?;
        let mut account = unit
            .lock_account(located.employee_id, located.category)
            .await?
            .ok_or(LeaveError::AccountNotFound(located.employee_id))?;
        account.ensure_organization(input.organization_id)?;

        let mut request = unit
            .find_request(input.request_id)
            .await?
            .ok_or(LeaveError::RequestNotFound(input.request_id))?;

        let transition = LeaveStateMachine::review(
            request.status,
            input.new_status,
            request.total_days,
            input.reviewer_id,
            input.note,
        );

        if !transition.effect.is_unchanged() {
            let balance = match account.adjust(request.category, transition.effect.delta()) {
                Ok(balance) => balance,
                Err(err) => {
                    warn!(
                        request_id = %request.id,
                        from = %request.status,
                        to = %input.new_status,
                        error = %err,
                        "Leave status change rejected"
                    );
                    return Err(err);
                }
            };
            unit.write_balance(request.employee_id, request.category, balance)
                .await?;
        }

        transition.apply_to(&mut request);
        unit.update_request(&request).await?;
        unit.commit().await?;

        info!(
            request_id = %request.id,
            reviewer_id = %input.reviewer_id,
            from = ?transition.from,
            to = %transition.to,
            delta = %transition.effect.delta(),
            "Leave request status changed"
        );
        Ok(request)
    }

    /// Returns one balance of an employee.
    pub async fn get_balance(
        &self,
        organization_id: OrganizationId,
        employee_id: EmployeeId,
        category: LeaveCategory,
    ) -> Result<Decimal, LeaveError> {
        let balances = self.get_balances(organization_id, employee_id).await?;
        Ok(balances.get(category))
    }

    /// Returns all balances of an employee.
    pub async fn get_balances(
        &self,
        organization_id: OrganizationId,
        employee_id: EmployeeId,
    ) -> Result<LeaveBalances, LeaveError> {
        let account = self
            .store
            .find_account(employee_id)
            .await?
            .ok_or(LeaveError::AccountNotFound(employee_id))?;
        account.ensure_organization(organization_id)?;
        Ok(account.balances)
    }
}
