//! Tool wrapper abstraction
//!
//! A [`ToolWrapper`] describes one external program (or a built-in) that can
//! perform operations within a [`ToolDomain`]:
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │ ToolWrapper                                      │
//! │  id / name / description / domain / install meta │
//! │  detect()      -> ToolStatus   (async, no error) │
//! │  operations()  -> &[OperationSpec]   (static)    │
//! │  execute(op)   -> OperationResult                │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Descriptors are immutable. Detection results are not stored on the
//! wrapper; the registry keeps them in a side table keyed by tool id.

use async_trait::async_trait;

use super::entities::{OperationSpec, Params, ToolDomain, ToolInfo, ToolOperationInfo, ToolStatus};
use super::value_objects::OperationResult;

#[async_trait]
pub trait ToolWrapper: Send + Sync {
    /// Stable identifier (e.g., "winget")
    fn id(&self) -> &str;

    /// Display name
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn domain(&self) -> ToolDomain;

    /// How the tool is normally installed (informational)
    fn install_method(&self) -> Option<&str> {
        None
    }

    /// Command that installs the tool (informational, never run)
    fn install_command(&self) -> Option<&str> {
        None
    }

    /// Probe whether the tool is installed.
    ///
    /// Must not fail: any probe error is reported as not installed.
    async fn detect(&self) -> ToolStatus;

    /// Declared operations. Safe to call before detection has run.
    fn operations(&self) -> &[OperationSpec];

    fn operation(&self, operation_id: &str) -> Option<&OperationSpec> {
        self.operations().iter().find(|op| op.id == operation_id)
    }

    /// Run one declared operation with already-normalized params.
    async fn execute(&self, operation_id: &str, params: &Params) -> OperationResult;

    /// Combine the descriptor with a detection outcome.
    fn info(&self, status: &ToolStatus) -> ToolInfo {
        ToolInfo {
            id: self.id().to_string(),
            name: self.name().to_string(),
            description: self.description().to_string(),
            domain: self.domain(),
            installed: status.installed,
            version: status.version.clone(),
            path: status.path.clone(),
            install_method: self.install_method().map(str::to_string),
            install_command: self.install_command().map(str::to_string),
            last_checked: None,
            capabilities: self.operations().iter().map(|op| op.name.clone()).collect(),
        }
    }

    /// Flattened operation views for discovery surfaces.
    fn operation_infos(&self) -> Vec<ToolOperationInfo> {
        self.operations()
            .iter()
            .map(|op| ToolOperationInfo {
                id: op.id.clone(),
                tool_id: self.id().to_string(),
                domain: self.domain(),
                name: op.name.clone(),
                description: op.description.clone(),
                tier: op.tier,
                params: op.params.clone(),
            })
            .collect()
    }
}
