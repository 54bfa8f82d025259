// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Cache settings loaded from TOML.
//!
//! Every key is optional; missing keys fall back to the defaults below and
//! unknown keys are rejected.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

fn default_db_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ride")
        .join("librarykeywords.db")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Location of the cache database file
    pub db_path: PathBuf,

    /// Seconds to wait on a database locked by another process
    pub busy_timeout_secs: u64,

    /// Discard and recreate a cache file that fails the schema check
    pub recreate_on_corruption: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            busy_timeout_secs: 30,
            recreate_on_corruption: true,
        }
    }
}

impl CacheConfig {
    /// Default settings with the database at `db_path`.
    pub fn at(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: CacheConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.busy_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                reason: "busy_timeout_secs must be greater than 0".to_string(),
            });
        }
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "db_path must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.busy_timeout(), Duration::from_secs(30));
        assert!(config.recreate_on_corruption);
        assert!(config.db_path.ends_with("ride/librarykeywords.db"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CacheConfig::from_toml(r#"db_path = "/tmp/kw.db""#).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/kw.db"));
        assert_eq!(config.busy_timeout_secs, 30);
        assert!(config.recreate_on_corruption);
    }

    #[test]
    fn test_full_toml() {
        let config = CacheConfig::from_toml(
            r#"
            db_path = "/var/cache/kw.db"
            busy_timeout_secs = 5
            recreate_on_corruption = false
            "#,
        )
        .unwrap();
        assert_eq!(
            config,
            CacheConfig {
                db_path: PathBuf::from("/var/cache/kw.db"),
                busy_timeout_secs: 5,
                recreate_on_corruption: false,
            }
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(matches!(
            CacheConfig::from_toml("busy_timeout_secs = 0"),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(
            CacheConfig::from_toml("workers = 4"),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.toml");
        std::fs::write(&path, "busy_timeout_secs = 7\n").unwrap();
        assert_eq!(CacheConfig::from_file(&path).unwrap().busy_timeout_secs, 7);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            CacheConfig::from_file(&missing),
            Err(ConfigError::ReadFile { .. })
        ));
    }
}
