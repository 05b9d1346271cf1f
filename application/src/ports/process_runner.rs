//! Process execution port
//!
//! `run(command_line, timeout) -> stdout | error`. The command line is handed
//! to the platform shell as-is; quoting is the caller's concern.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Why a process run did not produce output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("Failed to spawn process: {0}")]
    Spawn(String),

    #[error("Command timed out after {0:?}")]
    Timeout(Duration),

    /// Non-zero exit. Carries stderr, or a generic message when stderr is empty.
    #[error("{0}")]
    Failed(String),
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `command_line` through the platform shell.
    ///
    /// A process still running at `timeout` is killed and reported as
    /// [`ProcessError::Timeout`]. Returns trimmed stdout on exit code 0.
    async fn run(&self, command_line: &str, timeout: Duration) -> Result<String, ProcessError>;

    /// Run a PowerShell script via [`powershell_command_line`].
    async fn run_powershell(&self, script: &str, timeout: Duration) -> Result<String, ProcessError> {
        self.run(&powershell_command_line(script), timeout).await
    }

    /// Whether `program` can be found without spawning anything.
    ///
    /// Detection probes call this first so a missing binary costs no
    /// process spawn. Runners that cannot tell answer `true`.
    fn is_available(&self, _program: &str) -> bool {
        true
    }
}

/// Wrap a PowerShell script for the platform shell.
///
/// Double quotes inside the script are backslash-escaped.
pub fn powershell_command_line(script: &str) -> String {
    format!(
        "powershell -NoProfile -Command \"{}\"",
        script.replace('"', "\\\"")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_powershell_command_line_escapes_quotes() {
        assert_eq!(
            powershell_command_line("Get-Process"),
            "powershell -NoProfile -Command \"Get-Process\""
        );
        assert_eq!(
            powershell_command_line(r#"Write-Output "hi""#),
            r#"powershell -NoProfile -Command "Write-Output \"hi\"""#
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ProcessError::Timeout(Duration::from_secs(30)).to_string(),
            "Command timed out after 30s"
        );
        assert_eq!(ProcessError::Failed("access denied".into()).to_string(), "access denied");
    }
}
