//! Approval gate: the Action lifecycle state machine.
//!
//! ```text
//! pending ──deny──────────────────────────────> denied
//!    │
//!    └──approve──> approved ──execute──┬──────> executed
//!                                      └──────> failed
//! ```
//!
//! `denied`, `executed` and `failed` are terminal. Green Actions are stored
//! already `approved` and never pass through here.
//!
//! Two guards keep it to one execution and one terminal state per Action:
//!
//! 1. an in-process async lock per Action id, held across read, execute and
//!    write, so concurrent resolves of one id serialize and later callers see
//!    the terminal status;
//! 2. guarded repository writes. Approval first claims the row
//!    (`pending → approved`) and only the winner of that claim executes; the
//!    outcome is then written only over `approved`. A denial is written only
//!    over `pending`. This holds across processes sharing the store.
//!
//! The synchronous API ([`ApprovalGate::resolve`]) and the push channel
//! ([`ApprovalGate::handle_response`]) share the same path.

use super::execute_action::ActionExecutor;
use crate::ports::action_repository::{ActionFilter, ActionRepository, RepositoryError};
use crate::ports::operation_log::OperationLog;
use actiongate_domain::{Action, ActionError, ActionId, ActionResolution, ActionStatus};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Default page size of [`ApprovalGate::list`].
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Errors returned to the caller of a resolve request.
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Action not found")]
    NotFound(ActionId),

    #[error("Action already {0}")]
    AlreadyResolved(ActionStatus),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl GateError {
    /// Whether the request itself was at fault (as opposed to storage).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GateError::NotFound(_) | GateError::AlreadyResolved(_) | GateError::InvalidAction(_)
        )
    }
}

impl From<ActionError> for GateError {
    fn from(e: ActionError) -> Self {
        match e {
            ActionError::NotPending(status) => GateError::AlreadyResolved(status),
            other => GateError::InvalidAction(other.to_string()),
        }
    }
}

type ActionLock = Arc<tokio::sync::Mutex<()>>;

pub struct ApprovalGate {
    repository: Arc<dyn ActionRepository>,
    executor: Arc<ActionExecutor>,
    operation_log: Arc<dyn OperationLog>,
    locks: Mutex<HashMap<ActionId, ActionLock>>,
}

impl ApprovalGate {
    pub fn new(
        repository: Arc<dyn ActionRepository>,
        executor: Arc<ActionExecutor>,
        operation_log: Arc<dyn OperationLog>,
    ) -> Self {
        Self {
            repository,
            executor,
            operation_log,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, id: &ActionId) -> Result<Action, GateError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| GateError::NotFound(id.clone()))
    }

    /// Every pending Action, newest first.
    pub async fn list_pending(&self) -> Result<Vec<Action>, GateError> {
        Ok(self.repository.list(&ActionFilter::pending()).await?)
    }

    /// Actions filtered by status, newest first, at most `limit`
    /// (default [`DEFAULT_LIST_LIMIT`]).
    pub async fn list(
        &self,
        status: Option<ActionStatus>,
        limit: Option<usize>,
    ) -> Result<Vec<Action>, GateError> {
        let filter = ActionFilter {
            status,
            limit: Some(limit.unwrap_or(DEFAULT_LIST_LIMIT)),
            ..ActionFilter::default()
        };
        Ok(self.repository.list(&filter).await?)
    }

    /// Resolve a pending Action.
    ///
    /// `approved == false` denies without executing anything. `true` runs the
    /// executor and records `executed` or `failed`. A non-pending Action is
    /// rejected with [`GateError::AlreadyResolved`] before any execution.
    pub async fn resolve(&self, id: &ActionId, approved: bool) -> Result<Action, GateError> {
        let lock = self.lock_for(id);
        let outcome = {
            let _guard = lock.lock().await;
            self.resolve_locked(id, approved).await
        };
        self.release(id, &lock);
        outcome
    }

    /// Push-channel entry point.
    ///
    /// Same semantics as [`resolve`](Self::resolve), but client errors are
    /// only logged: the channel has no reply path.
    pub async fn handle_response(&self, id: &ActionId, approved: bool) -> Option<Action> {
        match self.resolve(id, approved).await {
            Ok(action) => Some(action),
            Err(e) if e.is_client_error() => {
                debug!(action_id = %id, error = %e, "Ignoring action response");
                None
            }
            Err(e) => {
                error!(action_id = %id, error = %e, "Failed to resolve action");
                None
            }
        }
    }

    async fn resolve_locked(&self, id: &ActionId, approved: bool) -> Result<Action, GateError> {
        let mut action = self.get(id).await?;
        action.ensure_pending()?;

        if !approved {
            let resolution = ActionResolution::denied(Utc::now());
            if !self.repository.update_status(id, &resolution).await? {
                return Err(self.lost_race(id).await);
            }
            action.apply(resolution)?;
            info!(action_id = %id, tier = %action.tier, "Action denied");
            return Ok(action);
        }

        if !self.repository.claim(id).await? {
            return Err(self.lost_race(id).await);
        }
        action.approve()?;

        info!(action_id = %id, tier = %action.tier, "Action approved, executing");
        let result = self
            .executor
            .execute(&action, Some(self.operation_log.as_ref()))
            .await;
        let resolution =
            ActionResolution::from_outcome(result.success, result.output, result.error, Utc::now());

        if !self.repository.update_status(id, &resolution).await? {
            // Only the claim holder writes over `approved`.
            let current = self.get(id).await?.status;
            error!(action_id = %id, status = %current, "Claimed action changed during execution");
            return Err(GateError::AlreadyResolved(current));
        }

        action.apply(resolution)?;
        info!(action_id = %id, status = %action.status, "Action resolved");
        Ok(action)
    }

    /// Resolved or claimed by another process between our read and write.
    async fn lost_race(&self, id: &ActionId) -> GateError {
        match self.get(id).await {
            Ok(current) => {
                warn!(action_id = %id, status = %current.status, "Lost resolution race");
                GateError::AlreadyResolved(current.status)
            }
            Err(e) => e,
        }
    }

    fn lock_for(&self, id: &ActionId) -> ActionLock {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(id.clone()).or_default().clone()
    }

    /// Drop the map entry once no other caller holds or waits on it.
    fn release(&self, id: &ActionId, lock: &ActionLock) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        // One reference in the map, one held by the caller.
        if Arc::strong_count(lock) <= 2 {
            locks.remove(id);
        }
    }
}
