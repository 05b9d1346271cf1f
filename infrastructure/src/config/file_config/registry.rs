//! Registry configuration from TOML (`[registry]` section)

use serde::{Deserialize, Serialize};

/// Raw registry configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRegistryConfig {
    /// Run tool detection when the process starts
    pub scan_on_startup: bool,
}

impl Default for FileRegistryConfig {
    fn default() -> Self {
        Self {
            scan_on_startup: true,
        }
    }
}
