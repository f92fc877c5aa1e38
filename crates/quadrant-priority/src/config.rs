//! Engine configuration.
//!
//! # Storage Structure
//!
//! All engine data lives under one data directory (`~/.quadrant` by default):
//!
//! ```text
//! ~/.quadrant/
//! ├── entities/     # projects, modules and tasks
//! ├── changes/      # priority-change audit log
//! ├── ranks.json    # rank high-water marks
//! └── roles.json    # user roles
//! ```
//!
//! # Environment Variables
//!
//! - `QUADRANT_DATA_DIR`: Override the data directory

use std::collections::HashSet;
use std::path::PathBuf;

use crate::policy::{ApprovalPolicy, Role};

/// Environment variable for a custom data directory.
pub const DATA_DIR_ENV: &str = "QUADRANT_DATA_DIR";

/// Default data directory name under home.
const DEFAULT_DATA_DIR: &str = ".quadrant";

const ROLES_FILE: &str = "roles.json";

/// Resolves the default data directory.
///
/// 1. `QUADRANT_DATA_DIR` environment variable if set
/// 2. `~/.quadrant` if home directory is available
/// 3. `.quadrant` in current directory as fallback
pub fn default_data_dir() -> PathBuf {
    std::env::var(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_DATA_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
        })
}

/// Configuration for the priority engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root directory for all persisted state.
    pub data_dir: PathBuf,
    /// Roles whose requests are approved without review.
    pub privileged_roles: HashSet<Role>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            privileged_roles: ApprovalPolicy::DEFAULT_PRIVILEGED.into_iter().collect(),
        }
    }
}

impl EngineConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Replaces the privileged role set.
    pub fn with_privileged_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.privileged_roles = roles.into_iter().collect();
        self
    }

    /// Path of the user-role table.
    pub fn roles_path(&self) -> PathBuf {
        self.data_dir.join(ROLES_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.privileged_roles.len(), 2);
        assert!(config.privileged_roles.contains(&Role::Admin));
        assert!(config.privileged_roles.contains(&Role::ProjectManager));
        assert!(config.roles_path().ends_with("roles.json"));
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::new()
            .with_data_dir("/tmp/quadrant-test")
            .with_privileged_roles([Role::Admin]);

        assert_eq!(config.data_dir, PathBuf::from("/tmp/quadrant-test"));
        assert_eq!(config.privileged_roles, HashSet::from([Role::Admin]));
        assert_eq!(
            config.roles_path(),
            PathBuf::from("/tmp/quadrant-test/roles.json")
        );
    }
}
