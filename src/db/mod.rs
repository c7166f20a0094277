//! Storage module for tracker data.
//!
//! Follows the Repository pattern so storage backends can be swapped:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (HTTP handlers, server binary)       │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs) - Business Logic           │
//! │  - Validation and cross-entity rules                     │
//! │  - Report and chart assembly                             │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴──────────────┐
//!     │ Local (in-memory)            │
//!     │ SQLite (worker thread)       │
//!     └──────────────────────────────┘
//! ```
//!
//! # Recommended Usage
//!
//! **For new code, use the service layer:**
//! ```ignore
//! use pastel_tracker::db::{services, factory::RepositoryFactory};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::from_env()?;
//!     services::seed_defaults(repo.as_ref()).await?;
//!     let categories = services::list_categories(repo.as_ref()).await?;
//!     Ok(())
//! }
//! ```

#[cfg(not(any(feature = "sqlite-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;


// ==================== Service Layer (Recommended for new code) ====================

pub use services::{
    create_activity, create_category, create_entry, daily_chart, delete_activity, delete_category,
    delete_entry, export_csv, get_activity, get_category, get_entry, get_settings, health_check,
    list_activities, list_categories, list_entries, monthly_chart, monthly_report, put_settings,
    seed_defaults, update_activity, update_category, update_entry, weekly_chart, weekly_report,
};

// ==================== Repository Pattern Exports ====================

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
#[cfg(feature = "local-repo")]
pub use repositories::LocalRepository;
#[cfg(feature = "sqlite-repo")]
pub use repositories::SqliteRepository;
pub use repository::{
    ActivityRepository, CategoryRepository, EntryFilter, EntryRepository, ErrorContext,
    FullRepository, RepositoryError, RepositoryResult, SettingsRepository,
};

use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn FullRepository>> = OnceLock::new();

/// Initialize the global repository singleton from environment config.
pub fn init_repository() -> Result<()> {
    if REPOSITORY.get().is_some() {
        return Ok(());
    }

    let repo = RepositoryFactory::from_env().map_err(|e| anyhow::Error::msg(e.to_string()))?;
    let _ = REPOSITORY.set(repo);
    Ok(())
}

/// Get a reference to the global repository instance.
pub fn get_repository() -> Result<&'static Arc<dyn FullRepository>> {
    if REPOSITORY.get().is_none() {
        let _ = init_repository();
    }

    REPOSITORY
        .get()
        .context("Database not initialized. Call init_repository() first.")
}
