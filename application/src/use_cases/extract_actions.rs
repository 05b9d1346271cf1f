//! Extract Actions use case.
//!
//! Runs the classifier over one AI turn and persists every Action it finds.
//! Not idempotent: feeding the same text twice stores duplicates, so callers
//! invoke it once per turn.

use crate::ports::action_repository::{ActionRepository, RepositoryError};
use actiongate_domain::{Action, extract_actions};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ExtractActionsUseCase {
    repository: Arc<dyn ActionRepository>,
}

impl ExtractActionsUseCase {
    pub fn new(repository: Arc<dyn ActionRepository>) -> Self {
        Self { repository }
    }

    /// Classify `text` and insert each resulting Action, in extraction order.
    pub async fn execute(
        &self,
        text: &str,
        conversation_id: &str,
    ) -> Result<Vec<Action>, RepositoryError> {
        let actions = extract_actions(text, conversation_id);

        for action in &actions {
            self.repository.insert(action).await?;
            debug!(
                action_id = %action.id,
                tier = %action.tier,
                module = %action.module,
                status = %action.status,
                "Stored action"
            );
        }

        info!(conversation_id, count = actions.len(), "Extracted actions");
        Ok(actions)
    }
}
