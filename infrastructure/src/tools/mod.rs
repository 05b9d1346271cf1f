//! Tool implementations and the registry that dispatches to them
//!
//! - `catalog`: the per-domain orchestrators and their external tools
//! - `catalog_tool`: data-driven [`ToolWrapper`](actiongate_domain::ToolWrapper)
//!   built from probes and command templates
//! - `organizer`: the in-process file organizer
//! - `registry`: detection, caching and intent dispatch

pub mod catalog;
pub mod catalog_tool;
pub mod organizer;
pub mod template;

mod registry;

pub use catalog_tool::{CatalogOperation, CatalogTool, Probe, VersionParse};
pub use organizer::{OrganizeReport, OrganizerTool, organize_directory};
pub use registry::{DEFAULT_DETECT_TIMEOUT, ToolRegistry};
pub use template::{Quoting, Template};
