//! CSV rendering of time entries for the export endpoint.

use crate::models::TimeEntry;
use crate::routes::summary::GroupBy;
use crate::services::summary::LabelIndex;

pub const CSV_HEADER: &str = "id,date,category,activity,duration_minutes,notes";

/// Render entries as CSV, one line per entry plus the header.
///
/// Notes are flattened: newlines and commas become spaces so each entry
/// stays on one unquoted line. Entries without an activity get an empty
/// activity column.
pub fn entries_to_csv(entries: &[TimeEntry], labels: &LabelIndex) -> String {
    let mut out = String::with_capacity(64 * (entries.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');

    for entry in entries {
        let category = labels.display_label(entry, GroupBy::Category);
        let activity = match entry.activity_id {
            Some(_) => labels.display_label(entry, GroupBy::Activity),
            None => "",
        };
        let notes = entry
            .notes
            .as_deref()
            .unwrap_or("")
            .replace(['\n', ','], " ");
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            entry.id, entry.date, category, activity, entry.duration_minutes, notes
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ActivityId, CategoryId, EntryId};
    use crate::models::{Activity, Category, TimeEntry};
    use chrono::{NaiveDate, Utc};

    fn fixtures() -> (LabelIndex, Vec<TimeEntry>) {
        let now = Utc::now();
        let labels = LabelIndex::new(
            &[Category {
                id: CategoryId::new(1),
                name: "Work".to_string(),
                color_hex: "#E6E0FF".to_string(),
                icon_key: None,
                sort_order: 0,
                created_at: now,
                updated_at: now,
            }],
            &[Activity {
                id: ActivityId::new(7),
                category_id: CategoryId::new(1),
                name: "Coding".to_string(),
                sort_order: 0,
                created_at: now,
                updated_at: now,
            }],
        );
        let entries = vec![
            TimeEntry {
                id: EntryId::new(1),
                date: NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
                category_id: CategoryId::new(1),
                activity_id: Some(ActivityId::new(7)),
                duration_minutes: 90,
                notes: Some("pairing,\nrefactor".to_string()),
                created_at: now,
                updated_at: now,
            },
            TimeEntry {
                id: EntryId::new(2),
                date: NaiveDate::from_ymd_opt(2024, 6, 13).unwrap(),
                category_id: CategoryId::new(1),
                activity_id: None,
                duration_minutes: 30,
                notes: None,
                created_at: now,
                updated_at: now,
            },
        ];
        (labels, entries)
    }

    #[test]
    fn test_header_and_row_shape() {
        let (labels, entries) = fixtures();
        let csv = entries_to_csv(&entries, &labels);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "1,2024-06-12,Work,Coding,90,pairing  refactor");
        assert_eq!(lines[2], "2,2024-06-13,Work,,30,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_entry_list() {
        let (labels, _) = fixtures();
        let csv = entries_to_csv(&[], &labels);
        assert_eq!(csv, format!("{CSV_HEADER}\n"));
    }
}
