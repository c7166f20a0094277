//! Repository configuration file support.
//!
//! Reads the backend selection and SQLite path from a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::factory::RepositoryType;
use super::repository::RepositoryError;

/// Repository configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub sqlite: SqliteSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// SQLite file settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqliteSettings {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl RepositoryConfig {
    /// Load repository configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        let config: RepositoryConfig = toml::from_str(&content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Load repository configuration from the default location.
    ///
    /// Searches for `repository.toml` in the current directory, then the
    /// parent directory.
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = [
            PathBuf::from("repository.toml"),
            PathBuf::from("../repository.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(RepositoryError::configuration(
            "No repository.toml found in standard locations",
        ))
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }

    /// The configured SQLite database path, if any.
    pub fn sqlite_path(&self) -> Option<&Path> {
        self.sqlite.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_config() {
        let toml = r#"
[repository]
type = "local"
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.repository.repo_type, "local");
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
        assert!(config.sqlite_path().is_none());
    }

    #[test]
    fn test_parse_sqlite_config() {
        let toml = r#"
[repository]
type = "sqlite"

[sqlite]
path = "data/tracker.db"
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Sqlite);
        assert_eq!(
            config.sqlite_path(),
            Some(Path::new("data/tracker.db"))
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        let toml = r#"
[repository]
type = "etcd"
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert!(config.repository_type().is_err());
    }
}
