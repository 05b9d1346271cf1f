//! Shell command runner on `tokio::process`.
//!
//! Command lines go through `cmd /C` on Windows and `sh -c` elsewhere. The
//! child is killed when the timeout fires or the future is dropped, and on
//! Linux also when this process dies.

use actiongate_application::{ProcessError, ProcessRunner};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, trace};

/// [`ProcessRunner`] backed by the platform shell.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn shell_command(command_line: &str) -> Command {
        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command_line]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command_line]);
            c
        };

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Linux: request kernel to send SIGTERM to child when parent dies.
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        cmd
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command_line: &str, timeout: Duration) -> Result<String, ProcessError> {
        trace!(command = command_line, ?timeout, "Spawning");

        let child = Self::shell_command(command_line)
            .spawn()
            .map_err(|e| ProcessError::Spawn(e.to_string()))?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| ProcessError::Spawn(e.to_string()))?,
            Err(_) => {
                debug!(command = command_line, ?timeout, "Command timed out");
                return Err(ProcessError::Timeout(timeout));
            }
        };

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            match output.status.code() {
                Some(code) => format!("Command failed with exit code {}: {}", code, command_line),
                None => format!("Command terminated by signal: {}", command_line),
            }
        } else {
            stderr
        };
        Err(ProcessError::Failed(message))
    }

    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_trimmed_stdout() {
        let out = TokioProcessRunner::new()
            .run("echo '  hello  '", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn test_nonzero_exit_reports_stderr() {
        let err = TokioProcessRunner::new()
            .run("echo boom >&2; exit 3", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(err, ProcessError::Failed("boom".into()));
    }

    #[tokio::test]
    async fn test_nonzero_exit_without_stderr() {
        let err = TokioProcessRunner::new()
            .run("exit 2", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ProcessError::Failed("Command failed with exit code 2: exit 2".into())
        );
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let started = std::time::Instant::now();
        let err = TokioProcessRunner::new()
            .run("sleep 10", Duration::from_millis(200))
            .await
            .unwrap_err();
        assert_eq!(err, ProcessError::Timeout(Duration::from_millis(200)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_is_available_uses_path_lookup() {
        let runner = TokioProcessRunner::new();
        assert!(runner.is_available("sh"));
        assert!(!runner.is_available("definitely-not-a-real-program-xyz"));
    }
}
