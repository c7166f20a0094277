use serde::{Deserialize, Serialize};

use crate::models::{Period, PeriodKind};

// =========================================================
// Summary report types
// =========================================================

/// Which display name entries are grouped under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Category,
    Activity,
}

/// One aggregated (label, total) pair for a period.
///
/// Produced fresh per report request and discarded after rendering; labels
/// are unique within one aggregation and rows are ordered by descending
/// total, ties broken by ascending label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub total_minutes: u64,
}

/// Summary report dataset for one period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReportData {
    pub period_kind: PeriodKind,
    pub period: Period,
    /// Totals grouped by category name.
    pub category_rows: Vec<SummaryRow>,
    /// Totals grouped by activity name (`Unassigned` for activity-less time).
    pub activity_rows: Vec<SummaryRow>,
    /// Sum over `category_rows`, which equals the sum over all entries in
    /// the period.
    pub total_minutes: u64,
}

/// Route function name constant for the weekly summary
pub const GET_WEEKLY_SUMMARY: &str = "get_weekly_summary";
/// Route function name constant for the monthly summary
pub const GET_MONTHLY_SUMMARY: &str = "get_monthly_summary";
