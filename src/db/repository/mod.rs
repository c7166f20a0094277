//! Repository abstraction for the tracker's persistent state.
//!
//! Storage backends implement the per-entity traits below; callers go
//! through [`FullRepository`] so the rest of the crate stays agnostic of
//! whether records live in memory or in SQLite.

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::api::{ActivityId, CategoryId, EntryId};
use crate::models::{
    Activity, ActivityInput, ActivityPatch, Category, CategoryInput, CategoryPatch, EntryInput,
    EntryPatch, Settings, TimeEntry,
};

/// Filter for entry listing queries. All fields are conjunctive; `None`
/// means "no constraint".
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub category_id: Option<CategoryId>,
    pub activity_id: Option<ActivityId>,
}

impl EntryFilter {
    /// Filter to an inclusive date range.
    pub fn date_range(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            date_from: Some(from),
            date_to: Some(to),
            ..Default::default()
        }
    }

    /// Whether an entry satisfies every set constraint.
    pub fn matches(&self, entry: &TimeEntry) -> bool {
        if let Some(from) = self.date_from {
            if entry.date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if entry.date > to {
                return false;
            }
        }
        if let Some(category_id) = self.category_id {
            if entry.category_id != category_id {
                return false;
            }
        }
        if let Some(activity_id) = self.activity_id {
            if entry.activity_id != Some(activity_id) {
                return false;
            }
        }
        true
    }
}

/// Storage operations for categories.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// List all categories, ordered by sort order then name.
    async fn list_categories(&self) -> RepositoryResult<Vec<Category>>;

    /// Fetch a single category by id.
    async fn get_category(&self, id: CategoryId) -> RepositoryResult<Option<Category>>;

    /// Insert a new category and return it with its assigned id.
    async fn insert_category(&self, input: CategoryInput) -> RepositoryResult<Category>;

    /// Apply a partial update. Returns the updated row.
    async fn update_category(
        &self,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> RepositoryResult<Category>;

    /// Delete a category. Returns `false` if it did not exist.
    async fn delete_category(&self, id: CategoryId) -> RepositoryResult<bool>;

    /// Number of entries referencing this category.
    async fn count_entries_for_category(&self, id: CategoryId) -> RepositoryResult<u64>;

    /// Number of activities belonging to this category.
    async fn count_activities_for_category(&self, id: CategoryId) -> RepositoryResult<u64>;
}

/// Storage operations for activities.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// List activities, optionally restricted to a category. Ordered by
    /// category, sort order, then name.
    async fn list_activities(
        &self,
        category_id: Option<CategoryId>,
    ) -> RepositoryResult<Vec<Activity>>;

    /// Fetch a single activity by id.
    async fn get_activity(&self, id: ActivityId) -> RepositoryResult<Option<Activity>>;

    /// Insert a new activity and return it with its assigned id.
    async fn insert_activity(&self, input: ActivityInput) -> RepositoryResult<Activity>;

    /// Apply a partial update. Returns the updated row.
    async fn update_activity(
        &self,
        id: ActivityId,
        patch: ActivityPatch,
    ) -> RepositoryResult<Activity>;

    /// Delete an activity. Returns `false` if it did not exist.
    async fn delete_activity(&self, id: ActivityId) -> RepositoryResult<bool>;

    /// Number of entries referencing this activity.
    async fn count_entries_for_activity(&self, id: ActivityId) -> RepositoryResult<u64>;
}

/// Storage operations for time entries.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// List entries matching a filter, ordered by date descending then
    /// id descending (newest first).
    async fn list_entries(&self, filter: EntryFilter) -> RepositoryResult<Vec<TimeEntry>>;

    /// Fetch a single entry by id.
    async fn get_entry(&self, id: EntryId) -> RepositoryResult<Option<TimeEntry>>;

    /// Insert a new entry and return it with its assigned id.
    async fn insert_entry(&self, input: EntryInput) -> RepositoryResult<TimeEntry>;

    /// Apply a partial update. Returns the updated row.
    async fn update_entry(&self, id: EntryId, patch: EntryPatch) -> RepositoryResult<TimeEntry>;

    /// Delete an entry. Returns `false` if it did not exist.
    async fn delete_entry(&self, id: EntryId) -> RepositoryResult<bool>;
}

/// Storage operations for the settings singleton.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Fetch the settings row, creating defaults if absent.
    async fn get_settings(&self) -> RepositoryResult<Settings>;

    /// Replace the settings row.
    async fn put_settings(&self, settings: Settings) -> RepositoryResult<Settings>;
}

/// A backend that implements every repository concern.
#[async_trait]
pub trait FullRepository:
    CategoryRepository + ActivityRepository + EntryRepository + SettingsRepository
{
    /// Verify the backend is reachable and healthy.
    async fn health_check(&self) -> RepositoryResult<()>;
}
