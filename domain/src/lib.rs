//! Domain layer for actiongate
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Action
//!
//! An Action is a proposed command extracted from AI output. Its risk tier
//! decides whether it may run without a human:
//!
//! - **green**: read-only, recorded as `approved`
//! - **yellow** / **red**: recorded as `pending`, waits for a decision
//!
//! ## Tools and intents
//!
//! Structured Actions name a `{domain, intent}` instead of a command line.
//! A [`DomainOrchestrator`] maps the intent onto the first installed tool
//! that can serve it.

pub mod action;
pub mod classifier;
pub mod orchestration;
pub mod tool;

// Re-export commonly used types
pub use action::{
    Action, ActionError, ActionId, ActionModule, ActionResolution, ActionStatus, Tier,
    ToolOperationPayload,
};
pub use classifier::{TOOL_ACTION_TAG, classify_tier, extract_actions};
pub use orchestration::{
    DomainOrchestrator, OperationRef, ParamNormalizer, RouteGap, capabilities_summary,
};
pub use tool::{
    NO_TOOL_ID, OperationResult, OperationSpec, ParamDef, Params, ToolDomain, ToolInfo,
    ToolOperationInfo, ToolStatus, ToolWrapper, UNKNOWN_TOOL_ID, UnknownDomain,
};
