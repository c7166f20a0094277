//! Public API surface for the tracker backend.
//!
//! This file consolidates the DTO types for the HTTP API.
//! All types derive Serialize/Deserialize for JSON serialization.

pub use crate::routes::chart::ChartSlice;
pub use crate::routes::chart::ChartSurface;
pub use crate::routes::chart::LegendRow;
pub use crate::routes::chart::PieChartData;
pub use crate::routes::summary::GroupBy;
pub use crate::routes::summary::SummaryReportData;
pub use crate::routes::summary::SummaryRow;

use serde::{Deserialize, Serialize};

/// Category identifier (database primary key).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub i64);

/// Activity identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActivityId(pub i64);

/// Time entry identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub i64);

impl CategoryId {
    pub fn new(value: i64) -> Self {
        CategoryId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl ActivityId {
    pub fn new(value: i64) -> Self {
        ActivityId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl EntryId {
    pub fn new(value: i64) -> Self {
        EntryId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for ActivityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CategoryId> for i64 {
    fn from(id: CategoryId) -> Self {
        id.0
    }
}
impl From<ActivityId> for i64 {
    fn from(id: ActivityId) -> Self {
        id.0
    }
}
impl From<EntryId> for i64 {
    fn from(id: EntryId) -> Self {
        id.0
    }
}

pub use crate::models::{Period, PeriodKind};
