//! SQLite backend tests against a temporary database file.

#![cfg(feature = "sqlite-repo")]

use chrono::NaiveDate;

use pastel_tracker::db::repositories::SqliteRepository;
use pastel_tracker::db::repository::{
    ActivityRepository, CategoryRepository, EntryFilter, EntryRepository, FullRepository,
    SettingsRepository,
};
use pastel_tracker::models::{ActivityInput, CategoryInput, EntryInput, EntryPatch, WeekStart};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn open_temp_repo() -> (tempfile::TempDir, SqliteRepository) {
    let dir = tempfile::tempdir().unwrap();
    let repo = SqliteRepository::new(dir.path().join("tracker.db")).unwrap();
    (dir, repo)
}

#[tokio::test]
async fn test_health_check_on_fresh_database() {
    let (_dir, repo) = open_temp_repo();
    repo.health_check().await.unwrap();
}

#[tokio::test]
async fn test_category_crud_roundtrip() {
    let (_dir, repo) = open_temp_repo();

    let created = repo
        .insert_category(CategoryInput {
            name: "Work".to_string(),
            color_hex: "#E6E0FF".to_string(),
            icon_key: None,
            sort_order: 1,
        })
        .await
        .unwrap();

    let fetched = repo.get_category(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Work");
    assert_eq!(fetched.color_hex, "#E6E0FF");
    assert_eq!(fetched.sort_order, 1);

    assert!(repo.delete_category(created.id).await.unwrap());
    assert!(repo.get_category(created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_entries_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracker.db");

    let category_id = {
        let repo = SqliteRepository::new(path.clone()).unwrap();
        let work = repo
            .insert_category(CategoryInput {
                name: "Work".to_string(),
                color_hex: "#E6E0FF".to_string(),
                icon_key: None,
                sort_order: 0,
            })
            .await
            .unwrap();
        repo.insert_entry(EntryInput {
            date: date("2026-03-02"),
            category_id: work.id,
            activity_id: None,
            duration_minutes: 45,
            notes: Some("standup".to_string()),
        })
        .await
        .unwrap();
        work.id
    };

    let repo = SqliteRepository::new(path).unwrap();
    let entries = repo.list_entries(EntryFilter::default()).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].category_id, category_id);
    assert_eq!(entries[0].duration_minutes, 45);
    assert_eq!(entries[0].notes.as_deref(), Some("standup"));
}

#[tokio::test]
async fn test_entry_filter_and_ordering() {
    let (_dir, repo) = open_temp_repo();
    let work = repo
        .insert_category(CategoryInput {
            name: "Work".to_string(),
            color_hex: "#E6E0FF".to_string(),
            icon_key: None,
            sort_order: 0,
        })
        .await
        .unwrap();

    for day in ["2026-03-01", "2026-03-05", "2026-03-03"] {
        repo.insert_entry(EntryInput {
            date: date(day),
            category_id: work.id,
            activity_id: None,
            duration_minutes: 30,
            notes: None,
        })
        .await
        .unwrap();
    }

    let all = repo.list_entries(EntryFilter::default()).await.unwrap();
    let dates: Vec<NaiveDate> = all.iter().map(|e| e.date).collect();
    assert_eq!(
        dates,
        vec![date("2026-03-05"), date("2026-03-03"), date("2026-03-01")]
    );

    let windowed = repo
        .list_entries(EntryFilter::date_range(date("2026-03-02"), date("2026-03-04")))
        .await
        .unwrap();
    assert_eq!(windowed.len(), 1);
    assert_eq!(windowed[0].date, date("2026-03-03"));
}

#[tokio::test]
async fn test_entry_patch_clears_activity_in_sqlite() {
    let (_dir, repo) = open_temp_repo();
    let work = repo
        .insert_category(CategoryInput {
            name: "Work".to_string(),
            color_hex: "#E6E0FF".to_string(),
            icon_key: None,
            sort_order: 0,
        })
        .await
        .unwrap();
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

    let updated = repo
        .update_entry(
            entry.id,
            EntryPatch {
                activity_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.activity_id, None);

    let reread = repo.get_entry(entry.id).await.unwrap().unwrap();
    assert_eq!(reread.activity_id, None);
}

#[tokio::test]
async fn test_settings_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracker.db");

    {
        let repo = SqliteRepository::new(path.clone()).unwrap();
        let mut settings = repo.get_settings().await.unwrap();
        settings.week_start = WeekStart::Sunday;
        settings.rounding_increment = 30;
        repo.put_settings(settings).await.unwrap();
    }

    let repo = SqliteRepository::new(path).unwrap();
    let settings = repo.get_settings().await.unwrap();
    assert_eq!(settings.week_start, WeekStart::Sunday);
    assert_eq!(settings.rounding_increment, 30);
}

#[tokio::test]
async fn test_unique_category_name_enforced_by_schema() {
    let (_dir, repo) = open_temp_repo();
    let input = CategoryInput {
        name: "Work".to_string(),
        color_hex: "#E6E0FF".to_string(),
        icon_key: None,
        sort_order: 0,
    };
    repo.insert_category(input.clone()).await.unwrap();
    let err = repo.insert_category(input).await.unwrap_err();
    assert!(err.to_string().contains("validation") || err.to_string().contains("UNIQUE"));
}
