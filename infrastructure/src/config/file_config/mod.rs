//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every section is optional; missing keys take their defaults.

mod database;
mod execution;
mod logging;
mod registry;

pub use database::FileDatabaseConfig;
pub use execution::FileExecutionConfig;
pub use logging::FileLoggingConfig;
pub use registry::FileRegistryConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("{0} cannot be 0")]
    ZeroTimeout(&'static str),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Action and tool inventory storage
    pub database: FileDatabaseConfig,
    /// Process timeouts
    pub execution: FileExecutionConfig,
    /// Tool detection behavior
    pub registry: FileRegistryConfig,
    /// Log output
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.execution.command_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("execution.command_timeout_secs"));
        }
        if self.execution.detect_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("execution.detect_timeout_secs"));
        }
        Ok(())
    }
}
