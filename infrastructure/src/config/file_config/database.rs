//! Database configuration from TOML (`[database]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw database configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDatabaseConfig {
    /// SQLite file. Defaults to `<data_dir>/actiongate/actiongate.db`.
    pub path: Option<PathBuf>,
}

impl FileDatabaseConfig {
    /// Configured path, or the per-user data directory default.
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("actiongate")
                .join("actiongate.db")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let config = FileDatabaseConfig {
            path: Some(PathBuf::from("actions.db")),
        };
        assert_eq!(config.resolved_path(), PathBuf::from("actions.db"));
    }

    #[test]
    fn test_default_path_is_under_actiongate() {
        let path = FileDatabaseConfig::default().resolved_path();
        assert!(path.ends_with("actiongate/actiongate.db"));
    }
}
