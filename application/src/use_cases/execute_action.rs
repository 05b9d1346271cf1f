//! Action executor.
//!
//! Runs one Action and reports a uniform [`ExecutionResult`]. Branches on the
//! Action's module:
//!
//! | Module | Dispatch |
//! |--------|----------|
//! | `powershell` | `powershell -NoProfile -Command "<command>"` |
//! | `cmd` | `cmd /c <command>` |
//! | `shell` | command line as-is |
//! | `tool-operation` | payload parsed, routed through [`IntentDispatcher`] |
//! | anything else | `Unknown module: <module>`, nothing spawned |
//!
//! The executor never returns `Err`. Spawn failures, non-zero exits and
//! timeouts all become `success: false`.

use crate::ports::intent_dispatcher::IntentDispatcher;
use crate::ports::operation_log::OperationLog;
use crate::ports::process_runner::{ProcessError, ProcessRunner};
use actiongate_domain::{Action, ActionModule, OperationResult, ToolOperationPayload};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for literal commands.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of executing an Action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
        }
    }
}

impl From<OperationResult> for ExecutionResult {
    fn from(result: OperationResult) -> Self {
        Self {
            success: result.success,
            output: result.output,
            error: result.error,
        }
    }
}

impl From<Result<String, ProcessError>> for ExecutionResult {
    fn from(result: Result<String, ProcessError>) -> Self {
        match result {
            Ok(output) => Self::success(output),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

pub struct ActionExecutor {
    runner: Arc<dyn ProcessRunner>,
    dispatcher: Arc<dyn IntentDispatcher>,
    command_timeout: Duration,
}

impl ActionExecutor {
    pub fn new(runner: Arc<dyn ProcessRunner>, dispatcher: Arc<dyn IntentDispatcher>) -> Self {
        Self {
            runner,
            dispatcher,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Execute `action`.
    ///
    /// Tool operations need `log`; without it they fail before dispatch.
    pub async fn execute(&self, action: &Action, log: Option<&dyn OperationLog>) -> ExecutionResult {
        debug!(action_id = %action.id, module = %action.module, "Executing action");

        let result: ExecutionResult = match &action.module {
            ActionModule::PowerShell => self
                .runner
                .run_powershell(&action.command, self.command_timeout)
                .await
                .into(),
            ActionModule::Cmd => self
                .runner
                .run(&format!("cmd /c {}", action.command), self.command_timeout)
                .await
                .into(),
            ActionModule::Shell => self
                .runner
                .run(&action.command, self.command_timeout)
                .await
                .into(),
            ActionModule::ToolOperation => self.execute_tool_operation(action, log).await,
            ActionModule::Other(module) => {
                ExecutionResult::failure(format!("Unknown module: {}", module))
            }
        };

        if !result.success {
            warn!(
                action_id = %action.id,
                error = result.error.as_deref().unwrap_or(""),
                "Action execution failed"
            );
        }
        result
    }

    async fn execute_tool_operation(
        &self,
        action: &Action,
        log: Option<&dyn OperationLog>,
    ) -> ExecutionResult {
        let Some(log) = log else {
            return ExecutionResult::failure("Tool operations require an operation log");
        };

        let payload = match ToolOperationPayload::from_command(&action.command) {
            Ok(payload) => payload,
            Err(e) => {
                return ExecutionResult::failure(format!("Invalid tool operation payload: {}", e));
            }
        };

        self.dispatcher
            .execute_intent(
                &payload.domain,
                &payload.intent,
                &payload.params,
                log,
                Some(&action.id),
            )
            .await
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::operation_log::NoOperationLog;
    use actiongate_domain::{ActionId, Params, Tier};
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ==================== Test Mocks ====================

    struct MockRunner {
        response: Result<String, ProcessError>,
        calls: Mutex<Vec<(String, Duration)>>,
    }

    impl MockRunner {
        fn returning(response: Result<String, ProcessError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, Duration)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessRunner for MockRunner {
        async fn run(&self, command_line: &str, timeout: Duration) -> Result<String, ProcessError> {
            self.calls
                .lock()
                .unwrap()
                .push((command_line.to_string(), timeout));
            self.response.clone()
        }
    }

    #[derive(Default)]
    struct MockDispatcher {
        calls: Mutex<Vec<(String, String, Params, Option<ActionId>)>>,
    }

    #[async_trait]
    impl IntentDispatcher for MockDispatcher {
        async fn execute_intent(
            &self,
            domain: &str,
            intent: &str,
            params: &Params,
            _log: &dyn OperationLog,
            action_id: Option<&ActionId>,
        ) -> OperationResult {
            self.calls.lock().unwrap().push((
                domain.to_string(),
                intent.to_string(),
                params.clone(),
                action_id.cloned(),
            ));
            OperationResult::success("winget", "Successfully installed")
        }
    }

    fn executor(runner: Arc<MockRunner>, dispatcher: Arc<MockDispatcher>) -> ActionExecutor {
        ActionExecutor::new(runner, dispatcher)
    }

    fn action(module: ActionModule, command: &str) -> Action {
        Action::new(Tier::Yellow, module, "test", command).with_id("test-id")
    }

    // ==================== Literal commands ====================

    #[tokio::test]
    async fn test_powershell_is_wrapped() {
        let runner = MockRunner::returning(Ok("output".into()));
        let exec = executor(runner.clone(), Arc::new(MockDispatcher::default()));

        let result = exec
            .execute(&action(ActionModule::PowerShell, "Get-Process"), None)
            .await;

        assert_eq!(result, ExecutionResult::success("output"));
        assert_eq!(
            runner.calls(),
            vec![(
                "powershell -NoProfile -Command \"Get-Process\"".to_string(),
                DEFAULT_COMMAND_TIMEOUT
            )]
        );
    }

    #[tokio::test]
    async fn test_cmd_gets_prefix() {
        let runner = MockRunner::returning(Ok("dir output".into()));
        let exec = executor(runner.clone(), Arc::new(MockDispatcher::default()));

        let result = exec.execute(&action(ActionModule::Cmd, "dir C:\\"), None).await;

        assert!(result.success);
        assert_eq!(runner.calls()[0].0, "cmd /c dir C:\\");
    }

    #[tokio::test]
    async fn test_shell_runs_as_is_with_configured_timeout() {
        let runner = MockRunner::returning(Ok("shell output".into()));
        let exec = executor(runner.clone(), Arc::new(MockDispatcher::default()))
            .with_command_timeout(Duration::from_secs(5));

        exec.execute(&action(ActionModule::Shell, "ls -la"), None).await;

        assert_eq!(
            runner.calls(),
            vec![("ls -la".to_string(), Duration::from_secs(5))]
        );
    }

    #[tokio::test]
    async fn test_timeout_becomes_failure() {
        let runner = MockRunner::returning(Err(ProcessError::Timeout(Duration::from_secs(30))));
        let exec = executor(runner, Arc::new(MockDispatcher::default()));

        let result = exec.execute(&action(ActionModule::Shell, "sleep 60"), None).await;

        assert_eq!(
            result,
            ExecutionResult::failure("Command timed out after 30s")
        );
    }

    #[tokio::test]
    async fn test_unknown_module_spawns_nothing() {
        let runner = MockRunner::returning(Ok(String::new()));
        let exec = executor(runner.clone(), Arc::new(MockDispatcher::default()));

        let result = exec
            .execute(&action(ActionModule::from("python"), "print(1)"), None)
            .await;

        assert_eq!(result, ExecutionResult::failure("Unknown module: python"));
        assert!(runner.calls().is_empty());
    }

    // ==================== Tool operations ====================

    #[tokio::test]
    async fn test_tool_operation_requires_log() {
        let dispatcher = Arc::new(MockDispatcher::default());
        let exec = executor(MockRunner::returning(Ok(String::new())), dispatcher.clone());
        let payload = ToolOperationPayload::new("packages", "install").to_command();

        let result = exec
            .execute(&action(ActionModule::ToolOperation, &payload), None)
            .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("operation log"));
        assert!(dispatcher.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tool_operation_dispatches_payload() {
        let dispatcher = Arc::new(MockDispatcher::default());
        let exec = executor(MockRunner::returning(Ok(String::new())), dispatcher.clone());
        let payload = ToolOperationPayload::new("packages", "install")
            .with_param("package", "git")
            .to_command();

        let result = exec
            .execute(
                &action(ActionModule::ToolOperation, &payload),
                Some(&NoOperationLog),
            )
            .await;

        assert_eq!(result, ExecutionResult::success("Successfully installed"));
        let calls = dispatcher.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "packages");
        assert_eq!(calls[0].1, "install");
        assert_eq!(calls[0].2.get("package").map(String::as_str), Some("git"));
        assert_eq!(calls[0].3, Some(ActionId::new("test-id")));
    }

    #[tokio::test]
    async fn test_tool_operation_bad_payload() {
        let exec = executor(
            MockRunner::returning(Ok(String::new())),
            Arc::new(MockDispatcher::default()),
        );

        let result = exec
            .execute(
                &action(ActionModule::ToolOperation, "not json"),
                Some(&NoOperationLog),
            )
            .await;

        assert!(!result.success);
        assert!(result
            .error
            .unwrap()
            .starts_with("Invalid tool operation payload"));
    }
}
