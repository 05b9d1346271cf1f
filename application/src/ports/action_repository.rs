//! Action repository port
//!
//! Persistence contract for the Action audit record. One row per Action,
//! never deleted.

use actiongate_domain::{Action, ActionId, ActionResolution, ActionStatus};
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by an [`ActionRepository`] implementation.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Listing filter. Results are ordered newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionFilter {
    pub status: Option<ActionStatus>,
    pub conversation_id: Option<String>,
    pub limit: Option<usize>,
}

impl ActionFilter {
    /// Every pending action, unbounded.
    pub fn pending() -> Self {
        Self {
            status: Some(ActionStatus::Pending),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: ActionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[async_trait]
pub trait ActionRepository: Send + Sync {
    async fn insert(&self, action: &Action) -> Result<(), RepositoryError>;

    async fn get(&self, id: &ActionId) -> Result<Option<Action>, RepositoryError>;

    /// Move a row from `pending` to `approved` in one guarded write.
    ///
    /// Returns `false` when no pending row with this id exists, i.e. another
    /// caller (possibly another process) already claimed or denied it.
    async fn claim(&self, id: &ActionId) -> Result<bool, RepositoryError>;

    /// Write a terminal resolution, only if the stored row still holds
    /// [`ActionResolution::from_status`].
    ///
    /// Returns `false` when no such row exists.
    async fn update_status(
        &self,
        id: &ActionId,
        resolution: &ActionResolution,
    ) -> Result<bool, RepositoryError>;

    async fn list(&self, filter: &ActionFilter) -> Result<Vec<Action>, RepositoryError>;
}
