//! In-memory repository backend.
//!
//! Holds everything in a single mutex-guarded state struct. Used as the
//! default backend for tests and for running the server without a
//! database file.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::api::{ActivityId, CategoryId, EntryId};
use crate::db::repository::{
    ActivityRepository, CategoryRepository, EntryFilter, EntryRepository, ErrorContext,
    FullRepository, RepositoryError, RepositoryResult, SettingsRepository,
};
use crate::models::{
    Activity, ActivityInput, ActivityPatch, Category, CategoryInput, CategoryPatch, EntryInput,
    EntryPatch, Settings, TimeEntry,
};

#[derive(Debug, Default)]
struct LocalState {
    categories: BTreeMap<i64, Category>,
    activities: BTreeMap<i64, Activity>,
    entries: BTreeMap<i64, TimeEntry>,
    settings: Option<Settings>,
    next_category_id: i64,
    next_activity_id: i64,
    next_entry_id: i64,
}

/// Mutex-guarded in-memory storage.
#[derive(Debug, Default)]
pub struct LocalRepository {
    state: Mutex<LocalState>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, LocalState>> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::internal("local repository state poisoned"))
    }
}

fn category_sort_key(category: &Category) -> (i64, String) {
    (category.sort_order, category.name.clone())
}

fn activity_sort_key(activity: &Activity) -> (i64, i64, String) {
    (
        activity.category_id.value(),
        activity.sort_order,
        activity.name.clone(),
    )
}

#[async_trait]
impl CategoryRepository for LocalRepository {
    async fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        let state = self.lock()?;
        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by_key(category_sort_key);
        Ok(categories)
    }

    async fn get_category(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        let state = self.lock()?;
        Ok(state.categories.get(&id.value()).cloned())
    }

    async fn insert_category(&self, input: CategoryInput) -> RepositoryResult<Category> {
        let mut state = self.lock()?;
        state.next_category_id += 1;
        let now = Utc::now();
        let category = Category {
            id: CategoryId::new(state.next_category_id),
            name: input.name,
            color_hex: input.color_hex,
            icon_key: input.icon_key,
            sort_order: input.sort_order,
            created_at: now,
            updated_at: now,
        };
        state.categories.insert(category.id.value(), category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> RepositoryResult<Category> {
        let mut state = self.lock()?;
        let category = state.categories.get_mut(&id.value()).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("category {} not found", id),
                ErrorContext::new("update_category").with_entity("category").with_entity_id(id),
            )
        })?;
        if let Some(name) = patch.name {
            category.name = name;
        }
        if let Some(color_hex) = patch.color_hex {
            category.color_hex = color_hex;
        }
        if let Some(icon_key) = patch.icon_key {
            category.icon_key = Some(icon_key);
        }
        if let Some(sort_order) = patch.sort_order {
            category.sort_order = sort_order;
        }
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: CategoryId) -> RepositoryResult<bool> {
        let mut state = self.lock()?;
        Ok(state.categories.remove(&id.value()).is_some())
    }

    async fn count_entries_for_category(&self, id: CategoryId) -> RepositoryResult<u64> {
        let state = self.lock()?;
        Ok(state
            .entries
            .values()
            .filter(|entry| entry.category_id == id)
            .count() as u64)
    }

    async fn count_activities_for_category(&self, id: CategoryId) -> RepositoryResult<u64> {
        let state = self.lock()?;
        Ok(state
            .activities
            .values()
            .filter(|activity| activity.category_id == id)
            .count() as u64)
    }
}

#[async_trait]
impl ActivityRepository for LocalRepository {
    async fn list_activities(
        &self,
        category_id: Option<CategoryId>,
    ) -> RepositoryResult<Vec<Activity>> {
        let state = self.lock()?;
        let mut activities: Vec<Activity> = state
            .activities
            .values()
            .filter(|activity| category_id.is_none_or(|id| activity.category_id == id))
            .cloned()
            .collect();
        activities.sort_by_key(activity_sort_key);
        Ok(activities)
    }

    async fn get_activity(&self, id: ActivityId) -> RepositoryResult<Option<Activity>> {
        let state = self.lock()?;
        Ok(state.activities.get(&id.value()).cloned())
    }

    async fn insert_activity(&self, input: ActivityInput) -> RepositoryResult<Activity> {
        let mut state = self.lock()?;
        state.next_activity_id += 1;
        let now = Utc::now();
        let activity = Activity {
            id: ActivityId::new(state.next_activity_id),
            category_id: input.category_id,
            name: input.name,
            sort_order: input.sort_order,
            created_at: now,
            updated_at: now,
        };
        state.activities.insert(activity.id.value(), activity.clone());
        Ok(activity)
    }

    async fn update_activity(
        &self,
        id: ActivityId,
        patch: ActivityPatch,
    ) -> RepositoryResult<Activity> {
        let mut state = self.lock()?;
        let activity = state.activities.get_mut(&id.value()).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("activity {} not found", id),
                ErrorContext::new("update_activity").with_entity("activity").with_entity_id(id),
            )
        })?;
        if let Some(name) = patch.name {
            activity.name = name;
        }
        if let Some(category_id) = patch.category_id {
            activity.category_id = category_id;
        }
        if let Some(sort_order) = patch.sort_order {
            activity.sort_order = sort_order;
        }
        activity.updated_at = Utc::now();
        Ok(activity.clone())
    }

    async fn delete_activity(&self, id: ActivityId) -> RepositoryResult<bool> {
        let mut state = self.lock()?;
        Ok(state.activities.remove(&id.value()).is_some())
    }

    async fn count_entries_for_activity(&self, id: ActivityId) -> RepositoryResult<u64> {
        let state = self.lock()?;
        Ok(state
            .entries
            .values()
            .filter(|entry| entry.activity_id == Some(id))
            .count() as u64)
    }
}

#[async_trait]
impl EntryRepository for LocalRepository {
    async fn list_entries(&self, filter: EntryFilter) -> RepositoryResult<Vec<TimeEntry>> {
        let state = self.lock()?;
        let mut entries: Vec<TimeEntry> = state
            .entries
            .values()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect();
        // Newest first, highest id breaking ties within a day.
        entries.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.id.value().cmp(&a.id.value()))
        });
        Ok(entries)
    }

    async fn get_entry(&self, id: EntryId) -> RepositoryResult<Option<TimeEntry>> {
        let state = self.lock()?;
        Ok(state.entries.get(&id.value()).cloned())
    }

    async fn insert_entry(&self, input: EntryInput) -> RepositoryResult<TimeEntry> {
        let mut state = self.lock()?;
        state.next_entry_id += 1;
        let now = Utc::now();
        let entry = TimeEntry {
            id: EntryId::new(state.next_entry_id),
            date: input.date,
            category_id: input.category_id,
            activity_id: input.activity_id,
            duration_minutes: input.duration_minutes,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };
        state.entries.insert(entry.id.value(), entry.clone());
        Ok(entry)
    }

    async fn update_entry(&self, id: EntryId, patch: EntryPatch) -> RepositoryResult<TimeEntry> {
        let mut state = self.lock()?;
        let entry = state.entries.get_mut(&id.value()).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("entry {} not found", id),
                ErrorContext::new("update_entry").with_entity("entry").with_entity_id(id),
            )
        })?;
        if let Some(date) = patch.date {
            entry.date = date;
        }
        if let Some(category_id) = patch.category_id {
            entry.category_id = category_id;
        }
        if let Some(activity_id) = patch.activity_id {
            entry.activity_id = activity_id;
        }
        if let Some(duration_minutes) = patch.duration_minutes {
            entry.duration_minutes = duration_minutes;
        }
        if let Some(notes) = patch.notes {
            entry.notes = Some(notes);
        }
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete_entry(&self, id: EntryId) -> RepositoryResult<bool> {
        let mut state = self.lock()?;
        Ok(state.entries.remove(&id.value()).is_some())
    }
}

#[async_trait]
impl SettingsRepository for LocalRepository {
    async fn get_settings(&self) -> RepositoryResult<Settings> {
        let mut state = self.lock()?;
        Ok(state
            .settings
            .get_or_insert_with(Settings::default)
            .clone())
    }

    async fn put_settings(&self, settings: Settings) -> RepositoryResult<Settings> {
        let mut state = self.lock()?;
        state.settings = Some(settings.clone());
        Ok(settings)
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<()> {
        self.lock().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn category_input(name: &str, sort_order: i64) -> CategoryInput {
        CategoryInput {
            name: name.to_string(),
            color_hex: "#E6E0FF".to_string(),
            icon_key: None,
            sort_order,
        }
    }

    fn entry_input(day: &str, category_id: CategoryId, minutes: u32) -> EntryInput {
        EntryInput {
            date: date(day),
            category_id,
            activity_id: None,
            duration_minutes: minutes,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_categories_listed_by_sort_order_then_name() {
        let repo = LocalRepository::new();
        repo.insert_category(category_input("Zeta", 0)).await.unwrap();
        repo.insert_category(category_input("Alpha", 0)).await.unwrap();
        repo.insert_category(category_input("First", -1)).await.unwrap();

        let names: Vec<String> = repo
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["First", "Alpha", "Zeta"]);
    }

    #[tokio::test]
    async fn test_entries_listed_newest_first() {
        let repo = LocalRepository::new();
        let work = repo.insert_category(category_input("Work", 0)).await.unwrap();
        repo.insert_entry(entry_input("2026-03-02", work.id, 30)).await.unwrap();
        repo.insert_entry(entry_input("2026-03-04", work.id, 45)).await.unwrap();
        repo.insert_entry(entry_input("2026-03-04", work.id, 60)).await.unwrap();

        let entries = repo.list_entries(EntryFilter::default()).await.unwrap();
        let pairs: Vec<(NaiveDate, u32)> = entries
            .iter()
            .map(|e| (e.date, e.duration_minutes))
            .collect();
        // Same-day entries come back highest id first.
        assert_eq!(
            pairs,
            vec![
                (date("2026-03-04"), 60),
                (date("2026-03-04"), 45),
                (date("2026-03-02"), 30),
            ]
        );
    }

    #[tokio::test]
    async fn test_entry_filter_date_range() {
        let repo = LocalRepository::new();
        let work = repo.insert_category(category_input("Work", 0)).await.unwrap();
        repo.insert_entry(entry_input("2026-03-01", work.id, 10)).await.unwrap();
        repo.insert_entry(entry_input("2026-03-05", work.id, 20)).await.unwrap();
        repo.insert_entry(entry_input("2026-03-09", work.id, 30)).await.unwrap();

        let filter = EntryFilter::date_range(date("2026-03-02"), date("2026-03-08"));
        let entries = repo.list_entries(filter).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].duration_minutes, 20);
    }

    #[tokio::test]
    async fn test_update_missing_entry_is_not_found() {
        let repo = LocalRepository::new();
        let err = repo
            .update_entry(EntryId::new(99), EntryPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_entry_patch_clears_activity() {
        let repo = LocalRepository::new();
        let work = repo.insert_category(category_input("Work", 0)).await.unwrap();
        let coding = repo
            .insert_activity(ActivityInput {
                name: "Coding".to_string(),
                category_id: work.id,
                sort_order: 0,
            })
            .await
            .unwrap();
        let entry = repo
            .insert_entry(EntryInput {
                date: date("2026-03-02"),
                category_id: work.id,
                activity_id: Some(coding.id),
                duration_minutes: 25,
                notes: None,
            })
            .await
            .unwrap();

        let patch = EntryPatch {
            activity_id: Some(None),
            ..Default::default()
        };
        let updated = repo.update_entry(entry.id, patch).await.unwrap();
        assert_eq!(updated.activity_id, None);
    }

    #[tokio::test]
    async fn test_settings_defaults_then_replace() {
        let repo = LocalRepository::new();
        let settings = repo.get_settings().await.unwrap();
        assert_eq!(settings.rounding_increment, 15);

        let mut updated = settings;
        updated.rounding_increment = 30;
        repo.put_settings(updated).await.unwrap();
        assert_eq!(repo.get_settings().await.unwrap().rounding_increment, 30);
    }

    #[tokio::test]
    async fn test_counts_track_references() {
        let repo = LocalRepository::new();
        let work = repo.insert_category(category_input("Work", 0)).await.unwrap();
        let coding = repo
            .insert_activity(ActivityInput {
                name: "Coding".to_string(),
                category_id: work.id,
                sort_order: 0,
            })
            .await
            .unwrap();
        repo.insert_entry(EntryInput {
            date: date("2026-03-02"),
            category_id: work.id,
            activity_id: Some(coding.id),
            duration_minutes: 25,
            notes: None,
        })
        .await
        .unwrap();

        assert_eq!(repo.count_activities_for_category(work.id).await.unwrap(), 1);
        assert_eq!(repo.count_entries_for_category(work.id).await.unwrap(), 1);
        assert_eq!(repo.count_entries_for_activity(coding.id).await.unwrap(), 1);
    }
}
