//! Domain entities for the tracker: categories, activities, time entries and
//! the singleton settings row.
//!
//! These are the persisted records. Inputs (`*Input`) are what callers submit
//! on create; patches (`*Patch`) carry optional fields for partial updates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ActivityId, CategoryId, EntryId};

/// Upper bound for a single entry, one full day in minutes.
pub const MAX_ENTRY_MINUTES: u32 = 24 * 60;

/// Maximum length of a category name, in characters.
pub const MAX_CATEGORY_NAME_CHARS: usize = 100;

/// Maximum length of an activity name, in characters.
pub const MAX_ACTIVITY_NAME_CHARS: usize = 120;

/// A top-level grouping for logged time (e.g. "Work", "Exercise").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    /// Unique display name.
    pub name: String,
    /// Pastel fill color used by the frontend for theming.
    pub color_hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_key: Option<String>,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A concrete activity within a category (e.g. "Coding" under "Work").
/// Names are unique per category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub category_id: CategoryId,
    pub name: String,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One logged block of time on a calendar day.
///
/// `activity_id` is optional: time can be logged against a category alone.
/// Such entries surface under the `Unassigned` label in activity groupings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: EntryId,
    pub date: NaiveDate,
    pub category_id: CategoryId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<ActivityId>,
    /// Positive, at most [`MAX_ENTRY_MINUTES`].
    pub duration_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input data for creating a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default = "default_category_color")]
    pub color_hex: String,
    #[serde(default)]
    pub icon_key: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
}

fn default_category_color() -> String {
    "#E6E0FF".to_string()
}

/// Partial update for a category; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color_hex: Option<String>,
    #[serde(default)]
    pub icon_key: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i64>,
}

/// Input data for creating an activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityInput {
    pub name: String,
    pub category_id: CategoryId,
    #[serde(default)]
    pub sort_order: i64,
}

/// Partial update for an activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub sort_order: Option<i64>,
}

/// Input data for creating a time entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryInput {
    pub date: NaiveDate,
    pub category_id: CategoryId,
    #[serde(default)]
    pub activity_id: Option<ActivityId>,
    pub duration_minutes: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update for a time entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryPatch {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// `Some(None)` clears the activity, `None` leaves it untouched.
    #[serde(default, with = "double_option")]
    pub activity_id: Option<Option<ActivityId>>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Serde helper distinguishing "absent" from "explicit null" for patches.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// How entry durations are rounded on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    #[default]
    None,
    Up,
    Down,
    Nearest,
}

impl RoundingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundingMode::None => "none",
            RoundingMode::Up => "up",
            RoundingMode::Down => "down",
            RoundingMode::Nearest => "nearest",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(RoundingMode::None),
            "up" => Some(RoundingMode::Up),
            "down" => Some(RoundingMode::Down),
            "nearest" => Some(RoundingMode::Nearest),
            _ => None,
        }
    }
}

/// First day of the summary week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekStart::Monday => "monday",
            WeekStart::Sunday => "sunday",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "monday" => Some(WeekStart::Monday),
            "sunday" => Some(WeekStart::Sunday),
            _ => None,
        }
    }
}

/// Singleton application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub rounding_mode: RoundingMode,
    pub rounding_increment: u32,
    pub week_start: WeekStart,
    pub primary_hex: String,
    pub accent_hex: String,
    /// Frosted-glass theme opacity, percent 0-100.
    pub glass_alpha: u32,
    pub glass_blur_px: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rounding_mode: RoundingMode::None,
            rounding_increment: 15,
            week_start: WeekStart::Monday,
            primary_hex: "#7c83fd".to_string(),
            accent_hex: "#E6E0FF".to_string(),
            glass_alpha: 85,
            glass_blur_px: 12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_mode_roundtrip() {
        for mode in [
            RoundingMode::None,
            RoundingMode::Up,
            RoundingMode::Down,
            RoundingMode::Nearest,
        ] {
            assert_eq!(RoundingMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(RoundingMode::parse("sideways"), None);
    }

    #[test]
    fn test_week_start_roundtrip() {
        assert_eq!(WeekStart::parse("monday"), Some(WeekStart::Monday));
        assert_eq!(WeekStart::parse("sunday"), Some(WeekStart::Sunday));
        assert_eq!(WeekStart::parse("friday"), None);
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.rounding_mode, RoundingMode::None);
        assert_eq!(settings.rounding_increment, 15);
        assert_eq!(settings.week_start, WeekStart::Monday);
        assert_eq!(settings.accent_hex, "#E6E0FF");
    }

    #[test]
    fn test_entry_patch_clears_activity() {
        let patch: EntryPatch = serde_json::from_str(r#"{"activity_id": null}"#).unwrap();
        assert_eq!(patch.activity_id, Some(None));

        let patch: EntryPatch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch.activity_id, None);
    }
}
