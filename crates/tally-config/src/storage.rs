//! Storage locations and log backend selection.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

fn default_db_path() -> String {
    ".tally/tally.db".to_string()
}

fn default_trail_dir() -> String {
    ".tally/trail".to_string()
}

/// Where activity log entries are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogBackend {
    /// The `activity_log` table of the record database.
    #[default]
    Database,
    /// An append-only `activity.jsonl` file in `trail_dir`.
    Jsonl,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Database file, relative to the project root unless absolute.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default)]
    pub log_backend: LogBackend,

    /// Directory for the JSONL log, relative to the project root unless
    /// absolute.
    #[serde(default = "default_trail_dir")]
    pub trail_dir: String,
}

impl StorageConfig {
    /// Database path resolved against `project_root`.
    #[must_use]
    pub fn db_path_in(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.db_path)
    }

    /// JSONL log directory resolved against `project_root`.
    #[must_use]
    pub fn trail_dir_in(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.trail_dir)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_backend: LogBackend::default(),
            trail_dir: default_trail_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = StorageConfig::default();
        assert_eq!(config.db_path, ".tally/tally.db");
        assert_eq!(config.trail_dir, ".tally/trail");
        assert_eq!(config.log_backend, LogBackend::Database);
    }

    #[test]
    fn relative_paths_resolve_against_root() {
        let config = StorageConfig::default();
        assert_eq!(
            config.db_path_in(Path::new("/srv/depot")),
            PathBuf::from("/srv/depot/.tally/tally.db")
        );

        let absolute = StorageConfig {
            db_path: "/var/lib/tally.db".to_string(),
            ..StorageConfig::default()
        };
        assert_eq!(
            absolute.db_path_in(Path::new("/srv/depot")),
            PathBuf::from("/var/lib/tally.db")
        );
    }
}
