//! Configuration file loading for actiongate
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `ACTIONGATE_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./actiongate.toml` or `./.actiongate.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/actiongate/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigError, FileConfig, FileDatabaseConfig, FileExecutionConfig, FileLoggingConfig,
    FileRegistryConfig,
};
pub use loader::ConfigLoader;
