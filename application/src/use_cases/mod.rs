//! Use cases (application services)
//!
//! - [`ExtractActionsUseCase`]: classify AI output and store the Actions
//! - [`ActionExecutor`]: run one Action, literal or structured
//! - [`ApprovalGate`]: resolve pending Actions, exactly once

pub mod approval_gate;
pub mod execute_action;
pub mod extract_actions;

pub use approval_gate::{ApprovalGate, DEFAULT_LIST_LIMIT, GateError};
pub use execute_action::{ActionExecutor, DEFAULT_COMMAND_TIMEOUT, ExecutionResult};
pub use extract_actions::ExtractActionsUseCase;
