//! Infrastructure layer for actiongate
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: SQLite persistence, process execution,
//! the tool catalog and registry, the push channel and configuration
//! file loading.

pub mod channel;
pub mod config;
pub mod persistence;
pub mod process;
pub mod tools;

// Re-export commonly used types
pub use channel::{ChannelError, ChannelStats, PushChannel, ResponseSink};
pub use config::{
    ConfigError, ConfigLoader, FileConfig, FileDatabaseConfig, FileExecutionConfig,
    FileLoggingConfig, FileRegistryConfig,
};
pub use persistence::SqliteStore;
pub use process::TokioProcessRunner;
pub use tools::{OrganizerTool, ToolRegistry};
