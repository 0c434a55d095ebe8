//! # tally-config
//!
//! Layered configuration loading for Tally using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`TALLY_*` prefix, `__` as separator)
//! 2. Project-level `.tally/config.toml`
//! 3. User-level `~/.config/tally/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `TALLY_STORAGE__DB_PATH` -> `storage.db_path`,
//! `TALLY_GENERAL__DEFAULT_LIMIT` -> `general.default_limit`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use tally_config::TallyConfig;
//!
//! let config = TallyConfig::load_with_dotenv().expect("config");
//! println!("database: {}", config.storage.db_path);
//! ```

mod error;
mod general;
mod import;
mod storage;

pub use error::ConfigError;
pub use general::GeneralConfig;
pub use import::ImportConfig;
pub use storage::{LogBackend, StorageConfig};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use tally_core::enums::Field;

/// Project-local directory holding config, database, and log files.
pub const PROJECT_DIR: &str = ".tally";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TallyConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub import: ImportConfig,
    /// Extra header spellings per canonical field (snake_case name), tried
    /// after the built-in ones.
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

impl TallyConfig {
    /// Load configuration from all sources, rooted at the current directory.
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."))
    }

    /// Load configuration with the project-local layer read from
    /// `{project_root}/.tally/config.toml`.
    pub fn load_from(project_root: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment_at(project_root).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain rooted at the current directory.
    pub fn figment() -> Figment {
        Self::figment_at(Path::new("."))
    }

    /// Build the figment provider chain for a project root.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    pub fn figment_at(project_root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = project_root.join(PROJECT_DIR).join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("TALLY_").split("__"))
    }

    /// Reject values the rest of the system cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.default_limit".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        for name in self.aliases.keys() {
            match Field::from_name(name) {
                Some(Field::Photos) | None => {
                    return Err(ConfigError::InvalidValue {
                        field: format!("aliases.{name}"),
                        reason: "not an importable field".to_string(),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tally").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TallyConfig::default();
        config.validate().unwrap();
        assert!(config.aliases.is_empty());
        assert!(!config.import.stop_on_error);
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|jail| {
            let root = jail.directory().to_path_buf();
            let config: TallyConfig = TallyConfig::figment_at(&root).extract()?;
            assert_eq!(config.general.default_limit, 20);
            assert_eq!(config.storage.log_backend, LogBackend::Database);
            Ok(())
        });
    }

    #[test]
    fn unknown_alias_field_is_invalid() {
        let mut config = TallyConfig::default();
        config
            .aliases
            .insert("colour".to_string(), vec!["Color".to_string()]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "aliases.colour"
        ));
    }

    #[test]
    fn zero_limit_is_invalid() {
        let mut config = TallyConfig::default();
        config.general.default_limit = 0;
        assert!(config.validate().is_err());
    }
}
