//! Data Transfer Objects for the HTTP API.
//!
//! Request and query types for the REST endpoints. Response DTOs for
//! reports and charts are re-exported from the routes module since they
//! already derive Serialize/Deserialize.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Re-export existing DTOs that are already serializable
pub use crate::api::{
    // Charts
    ChartSlice, ChartSurface, LegendRow, PieChartData,
    // Reports
    GroupBy, Period, PeriodKind, SummaryReportData, SummaryRow,
};
pub use crate::models::{
    Activity, ActivityInput, ActivityPatch, Category, CategoryInput, CategoryPatch, EntryInput,
    EntryPatch, Settings, TimeEntry,
};

/// Default chart surface edge in pixels.
const DEFAULT_CHART_EDGE: u32 = 400;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// API version
    pub version: String,
    /// Storage backend status
    pub database: String,
}

/// Listing wrapper for categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryListResponse {
    pub categories: Vec<Category>,
    pub total: usize,
}

/// Listing wrapper for activities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityListResponse {
    pub activities: Vec<Activity>,
    pub total: usize,
}

/// Listing wrapper for time entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryListResponse {
    pub entries: Vec<TimeEntry>,
    pub total: usize,
}

/// Query parameters for activity listing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ActivityListQuery {
    /// Restrict to one category
    #[serde(default)]
    pub category_id: Option<i64>,
}

/// Query parameters for entry listing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EntryListQuery {
    /// Inclusive start date (YYYY-MM-DD)
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Inclusive end date (YYYY-MM-DD)
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub activity_id: Option<i64>,
}

/// Query parameters for CSV export.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExportQuery {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

/// Query parameters for report endpoints. A missing date means today.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportQuery {
    /// Anchor date inside the requested period (YYYY-MM-DD)
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Query parameters for chart endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChartQuery {
    /// Anchor date inside the requested period (YYYY-MM-DD); today if absent
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Grouping for the slices; categories if absent
    #[serde(default)]
    pub group: Option<GroupBy>,
    /// Surface width in pixels
    #[serde(default)]
    pub width: Option<u32>,
    /// Surface height in pixels
    #[serde(default)]
    pub height: Option<u32>,
}

impl ChartQuery {
    pub fn surface(&self) -> ChartSurface {
        ChartSurface {
            width: self.width.unwrap_or(DEFAULT_CHART_EDGE),
            height: self.height.unwrap_or(DEFAULT_CHART_EDGE),
        }
    }

    pub fn group_by(&self) -> GroupBy {
        self.group.unwrap_or(GroupBy::Category)
    }
}
