//! Intent dispatch port
//!
//! The single entry point the executor uses for structured tool operations.
//! Implemented by the tool registry in the infrastructure layer.

use super::operation_log::OperationLog;
use actiongate_domain::{ActionId, OperationResult, Params};
use async_trait::async_trait;

#[async_trait]
pub trait IntentDispatcher: Send + Sync {
    /// Resolve `{domain, intent}` against installed tools and run it.
    ///
    /// Never fails with `Err`: unknown domains, unknown intents and missing
    /// tools come back as unsuccessful [`OperationResult`]s. One entry is
    /// written to `log` per call.
    async fn execute_intent(
        &self,
        domain: &str,
        intent: &str,
        params: &Params,
        log: &dyn OperationLog,
        action_id: Option<&ActionId>,
    ) -> OperationResult;
}
