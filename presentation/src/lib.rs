//! Presentation layer for actiongate
//!
//! This crate contains CLI definitions, output formatters,
//! and progress reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{ActionsCommand, Cli, Command, ResolveArgs, ToolsCommand};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::Spinner;
