//! Domain orchestration
//!
//! One [`DomainOrchestrator`] per [`ToolDomain`](crate::tool::ToolDomain)
//! resolves an abstract intent ("install", "gpu-info") to a concrete tool
//! operation, given the set of installed tool ids.
//!
//! - [`DomainOrchestrator`]: intent map, operation table and dispatch
//! - [`OperationRef`]: fixed or param-selected operation id
//! - [`capabilities_summary`]: prompt section listing reachable intents

pub mod orchestrator;
pub mod summary;

pub use orchestrator::{DomainOrchestrator, OperationRef, ParamNormalizer, RouteGap};
pub use summary::capabilities_summary;
