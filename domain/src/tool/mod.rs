//! Tool domain module: the capability model
//!
//! Defines what a tool is and what it can do, independent of how it is
//! detected or executed on a given machine.
//!
//! ```text
//! ┌──────────────┐    ┌───────────────┐    ┌─────────────────┐
//! │ ToolWrapper  │───▶│ OperationSpec │───▶│ OperationResult │
//! │ (descriptor) │    │ (declaration) │    │ (outcome)       │
//! └──────┬───────┘    └───────────────┘    └─────────────────┘
//!        │
//!        └─ detect() -> ToolStatus (cached by the registry, not here)
//! ```
//!
//! # Key Types
//!
//! - [`ToolWrapper`]: async trait implemented by every tool descriptor
//! - [`OperationSpec`] / [`ParamDef`]: static operation declarations
//! - [`ToolStatus`]: ephemeral detection outcome
//! - [`ToolInfo`] / [`ToolOperationInfo`]: discovery views
//! - [`OperationResult`]: uniform outcome, failures included
//! - [`ToolDomain`]: packages, drivers, debloat, file-ops, system-tools

pub mod entities;
pub mod value_objects;
pub mod wrapper;

pub use entities::{
    OperationSpec, ParamDef, Params, ToolDomain, ToolInfo, ToolOperationInfo, ToolStatus,
    UnknownDomain,
};
pub use value_objects::{NO_TOOL_ID, OperationResult, UNKNOWN_TOOL_ID};
pub use wrapper::ToolWrapper;
