//! Calendar windows used to bucket entries for summaries.
//!
//! A [`Period`] is an inclusive day range. Week windows are the 7-day span
//! containing an anchor date, starting on the configured weekday (Monday by
//! default, Sunday supported via settings); month windows are the calendar
//! month containing the anchor.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::entities::WeekStart;

/// Which kind of window a summary covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Week,
    Month,
}

/// Inclusive day range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// The 7-day week containing `anchor`, starting on `week_start`.
    pub fn week_containing(anchor: NaiveDate, week_start: WeekStart) -> Self {
        let days_since_start = match week_start {
            WeekStart::Monday => anchor.weekday().num_days_from_monday(),
            WeekStart::Sunday => anchor.weekday().num_days_from_sunday(),
        };
        let start = anchor - Days::new(u64::from(days_since_start));
        Self {
            start,
            end: start + Days::new(6),
        }
    }

    /// The calendar month containing `anchor`.
    pub fn month_containing(anchor: NaiveDate) -> Self {
        let start = anchor.with_day(1).unwrap_or(anchor);
        let next_month = if start.month() == 12 {
            NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
        };
        // Months always have a first day; the fallback never fires in practice.
        let end = next_month
            .map(|d| d - Days::new(1))
            .unwrap_or(start);
        Self { start, end }
    }

    /// A single day, used by the daily chart view.
    pub fn single_day(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days in the window.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Weekday the window starts on.
    pub fn start_weekday(&self) -> Weekday {
        self.start.weekday()
    }
}

#[cfg(test)]
#[path = "period_tests.rs"]
mod period_tests;
