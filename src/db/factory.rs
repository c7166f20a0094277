//! Repository factory for dependency injection.
//!
//! Creates repository instances based on runtime configuration: an
//! environment variable, a TOML config file, or explicit builder calls.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::RepositoryConfig;
#[cfg(feature = "local-repo")]
use super::repositories::LocalRepository;
#[cfg(feature = "sqlite-repo")]
use super::repositories::SqliteRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};

/// Environment variable naming the backend ("sqlite" or "local").
pub const REPOSITORY_TYPE_ENV: &str = "REPOSITORY_TYPE";
/// Environment variable holding the SQLite database path.
pub const DB_PATH_ENV: &str = "TRACKER_DB";

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// SQLite file-backed implementation
    Sqlite,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "sql" => Ok(Self::Sqlite),
            "local" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment variables.
    ///
    /// Reads `REPOSITORY_TYPE`. Defaults to Sqlite if a database path is
    /// present, otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var(REPOSITORY_TYPE_ENV) {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var(DB_PATH_ENV).is_ok() {
            Self::Sqlite
        } else {
            Self::Local
        }
    }
}

/// Centralized creation of repository instances.
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    pub fn create(
        repo_type: RepositoryType,
        db_path: Option<&Path>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Sqlite => {
                #[cfg(feature = "sqlite-repo")]
                {
                    let path = db_path.ok_or_else(|| {
                        RepositoryError::configuration(
                            "SQLite repository requires a database path",
                        )
                    })?;
                    let repo = Self::create_sqlite(path)?;
                    Ok(repo as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "sqlite-repo"))]
                {
                    let _ = db_path;
                    Err(RepositoryError::configuration(
                        "SQLite repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Local => Self::create_local(),
        }
    }

    /// Create a SQLite repository at the given path.
    #[cfg(feature = "sqlite-repo")]
    pub fn create_sqlite(path: &Path) -> RepositoryResult<Arc<SqliteRepository>> {
        let repo = SqliteRepository::new(path.to_path_buf())?;
        Ok(Arc::new(repo))
    }

    /// Create an in-memory local repository.
    #[cfg(feature = "local-repo")]
    pub fn create_local() -> RepositoryResult<Arc<dyn FullRepository>> {
        Ok(Arc::new(LocalRepository::new()))
    }

    #[cfg(not(feature = "local-repo"))]
    pub fn create_local() -> RepositoryResult<Arc<dyn FullRepository>> {
        Err(RepositoryError::configuration(
            "Local repository feature not enabled",
        ))
    }

    /// Create repository from environment configuration.
    ///
    /// `REPOSITORY_TYPE` selects the backend; `TRACKER_DB` supplies the
    /// SQLite path.
    pub fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = RepositoryType::from_env();
        let db_path = std::env::var(DB_PATH_ENV).ok().map(PathBuf::from);
        Self::create(repo_type, db_path.as_deref())
    }

    /// Create repository from a TOML configuration file.
    pub fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config)
    }

    /// Create repository from the default configuration file location.
    pub fn from_default_config() -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_default_location()?;
        Self::from_repository_config(&config)
    }

    fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;
        Self::create(repo_type, config.sqlite_path())
    }
}
