//! Action domain module
//!
//! The Action is the unit of work and the audit record of the approval gate.
//!
//! - [`Action`]: persisted record with tier, module, status and outcome
//! - [`ActionResolution`]: terminal transition written back in one update
//! - [`ToolOperationPayload`]: structured `{domain, intent, params}` command body

pub mod entities;
pub mod payload;

pub use entities::{Action, ActionError, ActionId, ActionModule, ActionResolution, ActionStatus, Tier};
pub use payload::ToolOperationPayload;
