//! Summary aggregation: the period totals behind reports, charts and CSV.
//!
//! [`aggregate`] is a pure function over its inputs. Each report request
//! builds a fresh [`LabelIndex`] from a consistent read of the store, runs
//! the aggregation and hands the ordered rows to whichever presentation path
//! asked for them (report table, pie chart, CSV).

use std::collections::{BTreeMap, HashMap};

use crate::api::{ActivityId, CategoryId};
use crate::models::{Activity, Category, Period, TimeEntry};
use crate::routes::summary::{GroupBy, SummaryRow};

/// Label shown for entries logged without an activity when grouping by
/// activity.
pub const UNASSIGNED_LABEL: &str = "Unassigned";

/// Label for entries whose foreign id no longer resolves. The repository
/// guards make this unreachable in practice, but minutes are never silently
/// dropped.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Display-name lookup for aggregation, built from one snapshot of the store.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    categories: HashMap<CategoryId, String>,
    activities: HashMap<ActivityId, String>,
}

impl LabelIndex {
    pub fn new(categories: &[Category], activities: &[Activity]) -> Self {
        Self {
            categories: categories
                .iter()
                .map(|c| (c.id, c.name.clone()))
                .collect(),
            activities: activities
                .iter()
                .map(|a| (a.id, a.name.clone()))
                .collect(),
        }
    }

    /// Display name the entry falls under for the given grouping.
    pub fn display_label(&self, entry: &TimeEntry, group_by: GroupBy) -> &str {
        match group_by {
            GroupBy::Category => self
                .categories
                .get(&entry.category_id)
                .map(String::as_str)
                .unwrap_or(UNKNOWN_LABEL),
            GroupBy::Activity => match entry.activity_id {
                Some(activity_id) => self
                    .activities
                    .get(&activity_id)
                    .map(String::as_str)
                    .unwrap_or(UNKNOWN_LABEL),
                None => UNASSIGNED_LABEL,
            },
        }
    }
}

/// Group the entries falling inside `period` and sum their minutes.
///
/// Rows come back ordered by descending total, ties broken by ascending
/// label. Zero-duration entries are retained (they can only enter the store
/// through rounding-free historical data, but the aggregator does not drop
/// them). An empty entry set yields an empty sequence, not an error.
pub fn aggregate(
    entries: &[TimeEntry],
    period: &Period,
    group_by: GroupBy,
    labels: &LabelIndex,
) -> Vec<SummaryRow> {
    // BTreeMap keeps labels unique and ascending, so the stable sort below
    // only has to order by total and the lexicographic tie-break falls out.
    let mut totals: BTreeMap<String, u64> = BTreeMap::new();

    for entry in entries {
        if !period.contains(entry.date) {
            continue;
        }
        *totals
            .entry(labels.display_label(entry, group_by).to_string())
            .or_insert(0) += u64::from(entry.duration_minutes);
    }

    let mut rows: Vec<SummaryRow> = totals
        .into_iter()
        .map(|(label, total_minutes)| SummaryRow {
            label,
            total_minutes,
        })
        .collect();
    rows.sort_by(|a, b| b.total_minutes.cmp(&a.total_minutes));
    rows
}

/// Sum of all row totals, the figure reports display as the period total.
pub fn total_minutes(rows: &[SummaryRow]) -> u64 {
    rows.iter().map(|r| r.total_minutes).sum()
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod summary_tests;
