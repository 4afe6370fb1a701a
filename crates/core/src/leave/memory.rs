//! In-process leave store.
//!
//! Balances are serialized per `(employee, category)` with a `tokio` mutex
//! held for the lifetime of a unit of work, so two categories of the same
//! employee never wait on each other. Committed state sits behind one
//! `RwLock`; a unit applies its staged writes under a single write guard,
//! so readers see all of a unit or none of it.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use hrm_shared::types::{EmployeeId, LeaveRequestId, OrganizationId, PageResponse};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::error::LeaveError;
use super::ledger::LeaveAccount;
use super::projection::{
    EmployeeLeaveSummary, LeaveFilter, LeaveReadModel, LeaveRequestView, paginate, sort_views,
};
use super::store::{LeaveStore, LeaveUnitOfWork};
use super::types::{LeaveCategory, LeaveRequest};

type BalanceKey = (EmployeeId, LeaveCategory);

#[derive(Default)]
struct State {
    accounts: HashMap<EmployeeId, LeaveAccount>,
    requests: HashMap<LeaveRequestId, LeaveRequest>,
}

struct Inner {
    state: RwLock<State>,
    locks: DashMap<BalanceKey, Arc<Mutex<()>>>,
    available: AtomicBool,
}

/// Leave store kept entirely in memory.
///
/// Cloning shares the underlying state.
#[derive(Clone)]
pub struct MemoryLeaveStore {
    inner: Arc<Inner>,
}

impl Default for MemoryLeaveStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLeaveStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(State::default()),
                locks: DashMap::new(),
                available: AtomicBool::new(true),
            }),
        }
    }

    /// Simulates an outage. While unavailable every commit fails with
    /// `Storage` and nothing staged is applied.
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::SeqCst);
    }

    /// Number of stored requests.
    pub async fn request_count(&self) -> usize {
        self.inner.state.read().await.requests.len()
    }
}

#[async_trait]
impl LeaveStore for MemoryLeaveStore {
    async fn begin(&self) -> Result<Box<dyn LeaveUnitOfWork>, LeaveError> {
        Ok(Box::new(MemoryUnit {
            inner: Arc::clone(&self.inner),
            guards: HashMap::new(),
            new_accounts: Vec::new(),
            balances: HashMap::new(),
            requests: HashMap::new(),
            inserted: HashSet::new(),
            committed: false,
        }))
    }

    async fn find_account(&self, employee_id: EmployeeId) -> Result<Option<LeaveAccount>, LeaveError> {
        Ok(self.inner.state.read().await.accounts.get(&employee_id).cloned())
    }

    async fn find_request(&self, request_id: LeaveRequestId) -> Result<Option<LeaveRequest>, LeaveError> {
        Ok(self.inner.state.read().await.requests.get(&request_id).cloned())
    }
}

struct MemoryUnit {
    inner: Arc<Inner>,
    guards: HashMap<BalanceKey, OwnedMutexGuard<()>>,
    new_accounts: Vec<LeaveAccount>,
    balances: HashMap<BalanceKey, Decimal>,
    requests: HashMap<LeaveRequestId, LeaveRequest>,
    inserted: HashSet<LeaveRequestId>,
    committed: bool,
}

impl MemoryUnit {
    fn ensure_open(&self) -> Result<(), LeaveError> {
        if self.committed {
            Err(LeaveError::Storage("unit of work already committed".into()))
        } else {
            Ok(())
        }
    }

    async fn acquire(&mut self, key: BalanceKey) {
        if self.guards.contains_key(&key) {
            return;
        }
        // Clone the Arc out so the DashMap shard is not held across the await.
        let lock = Arc::clone(self.inner.locks.entry(key).or_default().value());
        let guard = lock.lock_owned().await;
        self.guards.insert(key, guard);
    }
}

#[async_trait]
impl LeaveUnitOfWork for MemoryUnit {
    async fn lock_account(
        &mut self,
        employee_id: EmployeeId,
        category: LeaveCategory,
    ) -> Result<Option<LeaveAccount>, LeaveError> {
        self.ensure_open()?;
        self.acquire((employee_id, category)).await;

        let state = self.inner.state.read().await;
        let Some(mut account) = state.accounts.get(&employee_id).cloned().or_else(|| {
            self.new_accounts
                .iter()
                .find(|a| a.employee_id == employee_id)
                .cloned()
        }) else {
            return Ok(None);
        };
        for c in LeaveCategory::ALL {
            if let Some(staged) = self.balances.get(&(employee_id, c)) {
                account.balances.set(c, *staged);
            }
        }
        Ok(Some(account))
    }

    async fn find_request(&mut self, request_id: LeaveRequestId) -> Result<Option<LeaveRequest>, LeaveError> {
        self.ensure_open()?;
        if let Some(staged) = self.requests.get(&request_id) {
            return Ok(Some(staged.clone()));
        }
        Ok(self.inner.state.read().await.requests.get(&request_id).cloned())
    }

    async fn insert_account(&mut self, account: &LeaveAccount) -> Result<(), LeaveError> {
        self.ensure_open()?;
        let exists = self.inner.state.read().await.accounts.contains_key(&account.employee_id)
            || self.new_accounts.iter().any(|a| a.employee_id == account.employee_id);
        if exists {
            return Err(LeaveError::DuplicateAccount(account.employee_id));
        }
        self.new_accounts.push(account.clone());
        Ok(())
    }

    async fn write_balance(
        &mut self,
        employee_id: EmployeeId,
        category: LeaveCategory,
        balance: Decimal,
    ) -> Result<(), LeaveError> {
        self.ensure_open()?;
        let key = (employee_id, category);
        if !self.guards.contains_key(&key) {
            return Err(LeaveError::Storage(format!(
                "{category} balance of {employee_id} written without its lock"
            )));
        }
        if balance < Decimal::ZERO {
            return Err(LeaveError::Storage(format!(
                "{category} balance of {employee_id} would become negative"
            )));
        }
        self.balances.insert(key, balance);
        Ok(())
    }

    async fn insert_request(&mut self, request: &LeaveRequest) -> Result<(), LeaveError> {
        self.ensure_open()?;
        if self.requests.contains_key(&request.id)
            || self.inner.state.read().await.requests.contains_key(&request.id)
        {
            return Err(LeaveError::Validation(format!(
                "leave request {} already exists",
                request.id
            )));
        }
        self.inserted.insert(request.id);
        self.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn update_request(&mut self, request: &LeaveRequest) -> Result<(), LeaveError> {
        self.ensure_open()?;
        let known = self.requests.contains_key(&request.id)
            || self.inner.state.read().await.requests.contains_key(&request.id);
        if !known {
            return Err(LeaveError::RequestNotFound(request.id));
        }
        self.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), LeaveError> {
        self.ensure_open()?;
        if !self.inner.available.load(Ordering::SeqCst) {
            return Err(LeaveError::Storage("leave store unavailable".into()));
        }

        let mut state = self.inner.state.write().await;

        // Check everything before applying anything.
        if let Some(dup) = self
            .new_accounts
            .iter()
            .find(|a| state.accounts.contains_key(&a.employee_id))
        {
            return Err(LeaveError::DuplicateAccount(dup.employee_id));
        }
        if let Some(id) = self.inserted.iter().find(|id| state.requests.contains_key(*id)) {
            return Err(LeaveError::Validation(format!("leave request {id} already exists")));
        }
        for (employee_id, _) in self.balances.keys() {
            let known = state.accounts.contains_key(employee_id)
                || self.new_accounts.iter().any(|a| a.employee_id == *employee_id);
            if !known {
                return Err(LeaveError::AccountNotFound(*employee_id));
            }
        }

        let now = Utc::now();
        for account in self.new_accounts.drain(..) {
            state.accounts.insert(account.employee_id, account);
        }
        for ((employee_id, category), balance) in self.balances.drain() {
            if let Some(account) = state.accounts.get_mut(&employee_id) {
                account.balances.set(category, balance);
                account.updated_at = now;
            }
        }
        for (id, request) in self.requests.drain() {
            state.requests.insert(id, request);
        }
        drop(state);

        self.committed = true;
        self.guards.clear();
        Ok(())
    }
}

#[async_trait]
impl LeaveReadModel for MemoryLeaveStore {
    async fn list_requests(
        &self,
        organization_id: OrganizationId,
        filter: &LeaveFilter,
    ) -> Result<PageResponse<LeaveRequestView>, LeaveError> {
        let state = self.inner.state.read().await;
        let mut views: Vec<LeaveRequestView> = state
            .requests
            .values()
            .filter(|r| r.organization_id == organization_id)
            .filter_map(|r| {
                let account = state.accounts.get(&r.employee_id)?;
                filter
                    .matches(r, account)
                    .then(|| LeaveRequestView::new(r.clone(), account))
            })
            .collect();
        drop(state);

        sort_views(&mut views, filter.sort, filter.order);
        Ok(paginate(views, filter.page))
    }

    async fn get_request(
        &self,
        organization_id: OrganizationId,
        request_id: LeaveRequestId,
    ) -> Result<Option<LeaveRequestView>, LeaveError> {
        let state = self.inner.state.read().await;
        Ok(state
            .requests
            .get(&request_id)
            .filter(|r| r.organization_id == organization_id)
            .and_then(|r| {
                state
                    .accounts
                    .get(&r.employee_id)
                    .map(|account| LeaveRequestView::new(r.clone(), account))
            }))
    }

    async fn employee_summary(
        &self,
        organization_id: OrganizationId,
        employee_id: EmployeeId,
    ) -> Result<Option<EmployeeLeaveSummary>, LeaveError> {
        let state = self.inner.state.read().await;
        let Some(account) = state
            .accounts
            .get(&employee_id)
            .filter(|a| a.organization_id == organization_id)
        else {
            return Ok(None);
        };
        let requests: Vec<LeaveRequest> = state
            .requests
            .values()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect();
        Ok(Some(EmployeeLeaveSummary::build(account, &requests)))
    }
}
