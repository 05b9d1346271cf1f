//! Application layer for actiongate
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    ActionFilter, ActionRepository, IntentDispatcher, NoOperationLog, OperationLog,
    OperationLogEntry, ProcessError, ProcessRunner, RepositoryError, ToolInventoryStore,
    powershell_command_line,
};
pub use use_cases::{
    ActionExecutor, ApprovalGate, DEFAULT_COMMAND_TIMEOUT, DEFAULT_LIST_LIMIT, ExecutionResult,
    ExtractActionsUseCase, GateError,
};
