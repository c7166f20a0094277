use chrono::{NaiveDate, Utc};

use crate::api::{ActivityId, CategoryId, EntryId};
use crate::models::{Activity, Category, Period, TimeEntry, WeekStart};
use crate::routes::summary::GroupBy;
use crate::services::summary::{aggregate, total_minutes, LabelIndex, UNASSIGNED_LABEL};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn category(id: i64, name: &str) -> Category {
    Category {
        id: CategoryId::new(id),
        name: name.to_string(),
        color_hex: "#E6E0FF".to_string(),
        icon_key: None,
        sort_order: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn activity(id: i64, category_id: i64, name: &str) -> Activity {
    Activity {
        id: ActivityId::new(id),
        category_id: CategoryId::new(category_id),
        name: name.to_string(),
        sort_order: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn entry(id: i64, day: NaiveDate, category_id: i64, activity_id: Option<i64>, minutes: u32) -> TimeEntry {
    TimeEntry {
        id: EntryId::new(id),
        date: day,
        category_id: CategoryId::new(category_id),
        activity_id: activity_id.map(ActivityId::new),
        duration_minutes: minutes,
        notes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_labels() -> LabelIndex {
    LabelIndex::new(
        &[category(1, "Exercise"), category(2, "Reading"), category(3, "Work")],
        &[
            activity(10, 1, "Cardio"),
            activity(11, 1, "Yoga"),
            activity(20, 2, "Fiction"),
        ],
    )
}

#[test]
fn test_spec_example_tie_breaks_lexicographically() {
    // [(Exercise,30),(Exercise,20),(Reading,50)] -> [(Exercise,50),(Reading,50)]
    let day = date(2024, 6, 12);
    let period = Period::week_containing(day, WeekStart::Monday);
    let entries = vec![
        entry(1, day, 1, None, 30),
        entry(2, day, 1, None, 20),
        entry(3, day, 2, None, 50),
    ];

    let rows = aggregate(&entries, &period, GroupBy::Category, &test_labels());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].label, "Exercise");
    assert_eq!(rows[0].total_minutes, 50);
    assert_eq!(rows[1].label, "Reading");
    assert_eq!(rows[1].total_minutes, 50);
    assert_eq!(total_minutes(&rows), 100);
}

#[test]
fn test_sum_invariant() {
    let day = date(2024, 6, 12);
    let period = Period::month_containing(day);
    let entries = vec![
        entry(1, day, 1, Some(10), 45),
        entry(2, date(2024, 6, 1), 2, Some(20), 30),
        entry(3, date(2024, 6, 30), 3, None, 125),
        // Outside the window, must not count
        entry(4, date(2024, 7, 1), 1, Some(10), 999),
    ];

    let in_period: u64 = entries
        .iter()
        .filter(|e| period.contains(e.date))
        .map(|e| u64::from(e.duration_minutes))
        .sum();

    for group_by in [GroupBy::Category, GroupBy::Activity] {
        let rows = aggregate(&entries, &period, group_by, &test_labels());
        assert_eq!(total_minutes(&rows), in_period);
    }
}

#[test]
fn test_ordering_invariant() {
    let day = date(2024, 6, 12);
    let period = Period::week_containing(day, WeekStart::Monday);
    let entries = vec![
        entry(1, day, 3, None, 10),
        entry(2, day, 1, None, 200),
        entry(3, day, 2, None, 10),
    ];

    let rows = aggregate(&entries, &period, GroupBy::Category, &test_labels());
    let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
    // 200 first, then the 10-minute tie in label order
    assert_eq!(labels, vec!["Exercise", "Reading", "Work"]);
    for pair in rows.windows(2) {
        assert!(pair[0].total_minutes >= pair[1].total_minutes);
    }
}

#[test]
fn test_label_uniqueness() {
    let day = date(2024, 6, 12);
    let period = Period::week_containing(day, WeekStart::Monday);
    let entries: Vec<_> = (0..20).map(|i| entry(i, day, 1 + i % 3, None, 5)).collect();

    let rows = aggregate(&entries, &period, GroupBy::Category, &test_labels());
    let unique: std::collections::HashSet<&str> =
        rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(unique.len(), rows.len());
}

#[test]
fn test_empty_entries_yield_empty_rows() {
    let period = Period::month_containing(date(2024, 6, 1));
    let rows = aggregate(&[], &period, GroupBy::Category, &test_labels());
    assert!(rows.is_empty());
}

#[test]
fn test_no_entries_in_window_yield_empty_rows() {
    let period = Period::month_containing(date(2024, 6, 1));
    let entries = vec![entry(1, date(2024, 5, 31), 1, None, 60)];
    let rows = aggregate(&entries, &period, GroupBy::Category, &test_labels());
    assert!(rows.is_empty());
}

#[test]
fn test_zero_duration_rows_are_retained() {
    let day = date(2024, 6, 12);
    let period = Period::week_containing(day, WeekStart::Monday);
    let entries = vec![entry(1, day, 1, None, 0), entry(2, day, 2, None, 30)];

    let rows = aggregate(&entries, &period, GroupBy::Category, &test_labels());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].label, "Reading");
    assert_eq!(rows[1].label, "Exercise");
    assert_eq!(rows[1].total_minutes, 0);
}

#[test]
fn test_activity_grouping_uses_activity_names() {
    let day = date(2024, 6, 12);
    let period = Period::week_containing(day, WeekStart::Monday);
    let entries = vec![
        entry(1, day, 1, Some(10), 40),
        entry(2, day, 1, Some(11), 20),
        entry(3, day, 1, Some(10), 15),
    ];

    let rows = aggregate(&entries, &period, GroupBy::Activity, &test_labels());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].label, "Cardio");
    assert_eq!(rows[0].total_minutes, 55);
    assert_eq!(rows[1].label, "Yoga");
}

#[test]
fn test_activity_grouping_collects_unassigned() {
    let day = date(2024, 6, 12);
    let period = Period::week_containing(day, WeekStart::Monday);
    let entries = vec![
        entry(1, day, 1, None, 25),
        entry(2, day, 2, None, 25),
        entry(3, day, 1, Some(10), 10),
    ];

    let rows = aggregate(&entries, &period, GroupBy::Activity, &test_labels());
    assert_eq!(rows[0].label, UNASSIGNED_LABEL);
    assert_eq!(rows[0].total_minutes, 50);
    assert_eq!(total_minutes(&rows), 60);
}
