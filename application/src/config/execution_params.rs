//! Execution parameters: timeouts for spawned processes.
//!
//! These are application-layer concerns, not domain policy. Tool operations
//! carry their own declared timeouts; these values cover literal commands
//! and detection probes.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Timeout for literal powershell/cmd/shell Actions.
    pub command_timeout: Duration,
    /// Timeout for each tool's detection probe.
    pub detect_timeout: Duration,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(30),
            detect_timeout: Duration::from_secs(15),
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_detect_timeout(mut self, timeout: Duration) -> Self {
        self.detect_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ExecutionParams::default();
        assert_eq!(params.command_timeout, Duration::from_secs(30));
        assert_eq!(params.detect_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_builders() {
        let params = ExecutionParams::default()
            .with_command_timeout(Duration::from_secs(5))
            .with_detect_timeout(Duration::from_secs(2));
        assert_eq!(params.command_timeout, Duration::from_secs(5));
        assert_eq!(params.detect_timeout, Duration::from_secs(2));
    }
}
