//! Execution configuration from TOML (`[execution]` section)

use actiongate_application::ExecutionParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw execution configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutionConfig {
    /// Timeout for literal powershell/cmd/shell Actions
    pub command_timeout_secs: u64,
    /// Timeout for each tool detection probe
    pub detect_timeout_secs: u64,
}

impl Default for FileExecutionConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: 30,
            detect_timeout_secs: 15,
        }
    }
}

impl FileExecutionConfig {
    pub fn to_execution_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_command_timeout(Duration::from_secs(self.command_timeout_secs))
            .with_detect_timeout(Duration::from_secs(self.detect_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_execution_params() {
        let config = FileExecutionConfig {
            command_timeout_secs: 45,
            detect_timeout_secs: 3,
        };
        let params = config.to_execution_params();
        assert_eq!(params.command_timeout, Duration::from_secs(45));
        assert_eq!(params.detect_timeout, Duration::from_secs(3));
    }
}
