//! Port for the tool operation audit log.
//!
//! Every intent dispatch, whether it comes from an approved Action or a
//! direct call, is recorded here. This is separate from `tracing`: tracing
//! carries diagnostics, this log is queryable history.

use actiongate_domain::{ActionId, OperationResult, Params};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One dispatched intent and its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationLogEntry {
    pub action_id: Option<ActionId>,
    pub tool_id: String,
    pub domain: String,
    /// Intent as requested (the resolved operation id is tool-internal)
    pub operation_id: String,
    pub params: Params,
    pub success: bool,
    pub output: Option<String>,
    pub error: Option<String>,
    pub duration_ms: u64,
    pub executed_at: DateTime<Utc>,
}

impl OperationLogEntry {
    pub fn new(
        domain: impl Into<String>,
        operation_id: impl Into<String>,
        params: &Params,
        result: &OperationResult,
    ) -> Self {
        Self {
            action_id: None,
            tool_id: result.tool_id.clone(),
            domain: domain.into(),
            operation_id: operation_id.into(),
            params: params.clone(),
            success: result.success,
            output: result.output.clone(),
            error: result.error.clone(),
            duration_ms: result.duration_ms,
            executed_at: Utc::now(),
        }
    }

    pub fn with_action(mut self, action_id: Option<&ActionId>) -> Self {
        self.action_id = action_id.cloned();
        self
    }
}

/// Append-only sink for [`OperationLogEntry`] records.
///
/// Failures are reported to the caller, which decides whether they matter.
/// The registry only traces them.
#[async_trait]
pub trait OperationLog: Send + Sync {
    async fn record(&self, entry: &OperationLogEntry) -> Result<(), String>;
}

/// No-op implementation for tests and one-off dispatch.
pub struct NoOperationLog;

#[async_trait]
impl OperationLog for NoOperationLog {
    async fn record(&self, _entry: &OperationLogEntry) -> Result<(), String> {
        Ok(())
    }
}
