//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod action_repository;
pub mod intent_dispatcher;
pub mod operation_log;
pub mod process_runner;
pub mod tool_inventory;

pub use action_repository::{ActionFilter, ActionRepository, RepositoryError};
pub use intent_dispatcher::IntentDispatcher;
pub use operation_log::{NoOperationLog, OperationLog, OperationLogEntry};
pub use process_runner::{ProcessError, ProcessRunner, powershell_command_line};
pub use tool_inventory::ToolInventoryStore;
