//! Tool domain value objects: the uniform operation outcome
//!
//! Every path that runs something (a tool operation, an orchestrator
//! dispatch, a registry call) produces an [`OperationResult`]. Failures are
//! values, never `Err`: unknown intents, missing tools and process errors
//! all come back as `success: false` with an error string.
//!
//! Two sentinel tool ids mark failures that happened before any tool ran:
//!
//! | `tool_id` | Meaning |
//! |-----------|---------|
//! | `unknown` | Unknown domain or intent |
//! | `none` | No installed tool could serve the intent |

use serde::{Deserialize, Serialize};

/// Tool id reported when the domain or intent is not recognized.
pub const UNKNOWN_TOOL_ID: &str = "unknown";

/// Tool id reported when no eligible installed tool exists.
pub const NO_TOOL_ID: &str = "none";

/// Outcome of a tool operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub success: bool,
    pub tool_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock duration in milliseconds
    #[serde(rename = "duration")]
    pub duration_ms: u64,
}

impl OperationResult {
    pub fn success(tool_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            success: true,
            tool_id: tool_id.into(),
            output: Some(output.into()),
            error: None,
            duration_ms: 0,
        }
    }

    pub fn failure(tool_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            tool_id: tool_id.into(),
            output: None,
            error: Some(error.into()),
            duration_ms: 0,
        }
    }

    pub fn unknown(error: impl Into<String>) -> Self {
        Self::failure(UNKNOWN_TOOL_ID, error)
    }

    pub fn no_tool(error: impl Into<String>) -> Self {
        Self::failure(NO_TOOL_ID, error)
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let ok = OperationResult::success("winget", "done").with_duration(42);
        assert!(ok.is_success());
        assert_eq!(ok.output.as_deref(), Some("done"));
        assert_eq!(ok.duration_ms, 42);

        let none = OperationResult::no_tool("nothing installed");
        assert!(!none.success);
        assert_eq!(none.tool_id, NO_TOOL_ID);
        assert_eq!(none.error.as_deref(), Some("nothing installed"));
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let value = serde_json::to_value(OperationResult::unknown("bad").with_duration(3)).unwrap();
        assert_eq!(value["toolId"], "unknown");
        assert_eq!(value["duration"], 3);
        assert!(value.get("output").is_none());
    }
}
