//! Service layer: business logic over the repository abstraction.
//!
//! These functions validate input, enforce cross-entity rules (unique
//! names, activity/category consistency, deletion guards) and assemble
//! the report and chart datasets. They work with any [`FullRepository`]
//! implementation.

use chrono::NaiveDate;

use super::repository::{
    EntryFilter, ErrorContext, FullRepository, RepositoryError, RepositoryResult,
};
use crate::api::{ActivityId, CategoryId, EntryId};
use crate::models::{
    round_minutes, Activity, ActivityInput, ActivityPatch, Category, CategoryInput, CategoryPatch,
    EntryInput, EntryPatch, Period, PeriodKind, Settings, TimeEntry, MAX_ACTIVITY_NAME_CHARS,
    MAX_CATEGORY_NAME_CHARS, MAX_ENTRY_MINUTES,
};
use crate::routes::chart::{ChartSurface, PieChartData};
use crate::routes::summary::{GroupBy, SummaryReportData};
use crate::services::{aggregate, compute_pie_chart, entries_to_csv, total_minutes, LabelIndex};

/// Default categories (name, color, activities) installed on first run.
const DEFAULT_CATEGORIES: &[(&str, &str, &[&str])] = &[
    ("Work", "#E6E0FF", &["Meetings", "Email", "Deep Work"]),
    ("Personal", "#DFF5E1", &["Chores", "Errands"]),
    ("Health", "#E0F2FF", &["Exercise", "Sleep"]),
    ("Learning", "#FFF4D6", &["Reading", "Courses"]),
];

/// Verify the storage backend is reachable.
pub async fn health_check(repo: &dyn FullRepository) -> RepositoryResult<()> {
    repo.health_check().await
}

/// Install the default categories and activities if the store is empty.
///
/// Idempotent: does nothing when any category already exists.
pub async fn seed_defaults(repo: &dyn FullRepository) -> RepositoryResult<usize> {
    if !repo.list_categories().await?.is_empty() {
        return Ok(0);
    }

    let mut seeded = 0;
    for (order, (name, color, activities)) in DEFAULT_CATEGORIES.iter().enumerate() {
        let category = repo
            .insert_category(CategoryInput {
                name: (*name).to_string(),
                color_hex: (*color).to_string(),
                icon_key: None,
                sort_order: order as i64,
            })
            .await?;
        seeded += 1;
        for (activity_order, activity_name) in activities.iter().enumerate() {
            repo.insert_activity(ActivityInput {
                name: (*activity_name).to_string(),
                category_id: category.id,
                sort_order: activity_order as i64,
            })
            .await?;
            seeded += 1;
        }
    }
    Ok(seeded)
}

// ==================== Categories ====================

pub async fn list_categories(repo: &dyn FullRepository) -> RepositoryResult<Vec<Category>> {
    repo.list_categories().await
}

pub async fn get_category(
    repo: &dyn FullRepository,
    id: CategoryId,
) -> RepositoryResult<Category> {
    repo.get_category(id).await?.ok_or_else(|| {
        RepositoryError::not_found_with_context(
            format!("category {} not found", id),
            ErrorContext::new("get_category").with_entity("category").with_entity_id(id),
        )
    })
}

pub async fn create_category(
    repo: &dyn FullRepository,
    input: CategoryInput,
) -> RepositoryResult<Category> {
    let name = input.name.trim().to_string();
    validate_name(&name, "category", MAX_CATEGORY_NAME_CHARS)?;
    ensure_category_name_free(repo, &name, None).await?;
    repo.insert_category(CategoryInput { name, ..input }).await
}

pub async fn update_category(
    repo: &dyn FullRepository,
    id: CategoryId,
    patch: CategoryPatch,
) -> RepositoryResult<Category> {
    let mut patch = patch;
    if let Some(name) = patch.name.take() {
        let name = name.trim().to_string();
        validate_name(&name, "category", MAX_CATEGORY_NAME_CHARS)?;
        ensure_category_name_free(repo, &name, Some(id)).await?;
        patch.name = Some(name);
    }
    repo.update_category(id, patch).await
}

/// Delete a category. Fails with a validation error while entries or
/// activities still reference it.
pub async fn delete_category(repo: &dyn FullRepository, id: CategoryId) -> RepositoryResult<()> {
    if repo.count_entries_for_category(id).await? > 0 {
        return Err(RepositoryError::validation_with_context(
            "category still has time entries",
            ErrorContext::new("delete_category").with_entity("category").with_entity_id(id),
        ));
    }
    if repo.count_activities_for_category(id).await? > 0 {
        return Err(RepositoryError::validation_with_context(
            "category still has activities",
            ErrorContext::new("delete_category").with_entity("category").with_entity_id(id),
        ));
    }
    if !repo.delete_category(id).await? {
        return Err(RepositoryError::not_found(format!("category {} not found", id)));
    }
    Ok(())
}

async fn ensure_category_name_free(
    repo: &dyn FullRepository,
    name: &str,
    exclude: Option<CategoryId>,
) -> RepositoryResult<()> {
    let clash = repo
        .list_categories()
        .await?
        .into_iter()
        .any(|c| c.name == name && Some(c.id) != exclude);
    if clash {
        return Err(RepositoryError::validation(format!(
            "category '{}' already exists",
            name
        )));
    }
    Ok(())
}

// ==================== Activities ====================

pub async fn list_activities(
    repo: &dyn FullRepository,
    category_id: Option<CategoryId>,
) -> RepositoryResult<Vec<Activity>> {
    repo.list_activities(category_id).await
}

pub async fn get_activity(
    repo: &dyn FullRepository,
    id: ActivityId,
) -> RepositoryResult<Activity> {
    repo.get_activity(id).await?.ok_or_else(|| {
        RepositoryError::not_found_with_context(
            format!("activity {} not found", id),
            ErrorContext::new("get_activity").with_entity("activity").with_entity_id(id),
        )
    })
}

pub async fn create_activity(
    repo: &dyn FullRepository,
    input: ActivityInput,
) -> RepositoryResult<Activity> {
    let name = input.name.trim().to_string();
    validate_name(&name, "activity", MAX_ACTIVITY_NAME_CHARS)?;
    get_category(repo, input.category_id).await?;
    ensure_activity_name_free(repo, &name, input.category_id, None).await?;
    repo.insert_activity(ActivityInput { name, ..input }).await
}

pub async fn update_activity(
    repo: &dyn FullRepository,
    id: ActivityId,
    patch: ActivityPatch,
) -> RepositoryResult<Activity> {
    let current = get_activity(repo, id).await?;
    let target_category = match patch.category_id {
        Some(category_id) => {
            get_category(repo, category_id).await?;
            if category_id != current.category_id
                && repo.count_entries_for_activity(id).await? > 0
            {
                return Err(RepositoryError::validation_with_context(
                    "activity with time entries cannot move to another category",
                    ErrorContext::new("update_activity")
                        .with_entity("activity")
                        .with_entity_id(id),
                ));
            }
            category_id
        }
        None => current.category_id,
    };

    let mut patch = patch;
    match patch.name.take() {
        Some(name) => {
            let name = name.trim().to_string();
            validate_name(&name, "activity", MAX_ACTIVITY_NAME_CHARS)?;
            ensure_activity_name_free(repo, &name, target_category, Some(id)).await?;
            patch.name = Some(name);
        }
        None => {
            ensure_activity_name_free(repo, &current.name, target_category, Some(id)).await?;
        }
    }
    repo.update_activity(id, patch).await
}

/// Delete an activity. Fails with a validation error while entries still
/// reference it.
pub async fn delete_activity(repo: &dyn FullRepository, id: ActivityId) -> RepositoryResult<()> {
    if repo.count_entries_for_activity(id).await? > 0 {
        return Err(RepositoryError::validation_with_context(
            "activity still has time entries",
            ErrorContext::new("delete_activity").with_entity("activity").with_entity_id(id),
        ));
    }
    if !repo.delete_activity(id).await? {
        return Err(RepositoryError::not_found(format!("activity {} not found", id)));
    }
    Ok(())
}

async fn ensure_activity_name_free(
    repo: &dyn FullRepository,
    name: &str,
    category_id: CategoryId,
    exclude: Option<ActivityId>,
) -> RepositoryResult<()> {
    let clash = repo
        .list_activities(Some(category_id))
        .await?
        .into_iter()
        .any(|a| a.name == name && Some(a.id) != exclude);
    if clash {
        return Err(RepositoryError::validation(format!(
            "activity '{}' already exists in this category",
            name
        )));
    }
    Ok(())
}

// ==================== Time entries ====================

pub async fn list_entries(
    repo: &dyn FullRepository,
    filter: EntryFilter,
) -> RepositoryResult<Vec<TimeEntry>> {
    repo.list_entries(filter).await
}

pub async fn get_entry(repo: &dyn FullRepository, id: EntryId) -> RepositoryResult<TimeEntry> {
    repo.get_entry(id).await?.ok_or_else(|| {
        RepositoryError::not_found_with_context(
            format!("entry {} not found", id),
            ErrorContext::new("get_entry").with_entity("entry").with_entity_id(id),
        )
    })
}

/// Create a time entry, applying the configured duration rounding.
pub async fn create_entry(
    repo: &dyn FullRepository,
    input: EntryInput,
) -> RepositoryResult<TimeEntry> {
    get_category(repo, input.category_id).await?;
    ensure_activity_in_category(repo, input.activity_id, input.category_id).await?;

    // Bounds apply to the requested duration; rounding never rescues a zero
    validate_duration(input.duration_minutes)?;
    let settings = repo.get_settings().await?;
    let duration = round_minutes(
        input.duration_minutes,
        settings.rounding_mode,
        settings.rounding_increment,
    )
    .min(MAX_ENTRY_MINUTES);

    repo.insert_entry(EntryInput {
        duration_minutes: duration,
        ..input
    })
    .await
}

/// Update a time entry. A changed duration is rounded like on create; the
/// activity is re-checked against the (possibly changed) category.
pub async fn update_entry(
    repo: &dyn FullRepository,
    id: EntryId,
    patch: EntryPatch,
) -> RepositoryResult<TimeEntry> {
    let current = get_entry(repo, id).await?;

    let category_id = patch.category_id.unwrap_or(current.category_id);
    if patch.category_id.is_some() {
        get_category(repo, category_id).await?;
    }
    let activity_id = match patch.activity_id {
        Some(activity_id) => activity_id,
        None => current.activity_id,
    };
    ensure_activity_in_category(repo, activity_id, category_id).await?;

    let patch = match patch.duration_minutes {
        Some(duration_minutes) => {
            validate_duration(duration_minutes)?;
            let settings = repo.get_settings().await?;
            let duration = round_minutes(
                duration_minutes,
                settings.rounding_mode,
                settings.rounding_increment,
            )
            .min(MAX_ENTRY_MINUTES);
            EntryPatch {
                duration_minutes: Some(duration),
                ..patch
            }
        }
        None => patch,
    };

    repo.update_entry(id, patch).await
}

pub async fn delete_entry(repo: &dyn FullRepository, id: EntryId) -> RepositoryResult<()> {
    if !repo.delete_entry(id).await? {
        return Err(RepositoryError::not_found(format!("entry {} not found", id)));
    }
    Ok(())
}

fn validate_name(name: &str, what: &str, max_chars: usize) -> RepositoryResult<()> {
    if name.is_empty() {
        return Err(RepositoryError::validation(format!(
            "{} name must not be empty",
            what
        )));
    }
    if name.chars().count() > max_chars {
        return Err(RepositoryError::validation(format!(
            "{} name must be at most {} characters",
            what, max_chars
        )));
    }
    Ok(())
}

fn validate_duration(minutes: u32) -> RepositoryResult<()> {
    if minutes == 0 || minutes > MAX_ENTRY_MINUTES {
        return Err(RepositoryError::validation(format!(
            "duration must be between 1 and {} minutes, got {}",
            MAX_ENTRY_MINUTES, minutes
        )));
    }
    Ok(())
}

async fn ensure_activity_in_category(
    repo: &dyn FullRepository,
    activity_id: Option<ActivityId>,
    category_id: CategoryId,
) -> RepositoryResult<()> {
    if let Some(activity_id) = activity_id {
        let activity = get_activity(repo, activity_id).await?;
        if activity.category_id != category_id {
            return Err(RepositoryError::validation(format!(
                "activity {} does not belong to category {}",
                activity_id, category_id
            )));
        }
    }
    Ok(())
}

// ==================== Settings ====================

pub async fn get_settings(repo: &dyn FullRepository) -> RepositoryResult<Settings> {
    repo.get_settings().await
}

pub async fn put_settings(
    repo: &dyn FullRepository,
    settings: Settings,
) -> RepositoryResult<Settings> {
    if settings.glass_alpha > 100 {
        return Err(RepositoryError::validation(
            "glass_alpha must be a percentage between 0 and 100",
        ));
    }
    repo.put_settings(settings).await
}

// ==================== Reports and charts ====================

async fn label_index(repo: &dyn FullRepository) -> RepositoryResult<LabelIndex> {
    let categories = repo.list_categories().await?;
    let activities = repo.list_activities(None).await?;
    Ok(LabelIndex::new(&categories, &activities))
}

async fn report_for_period(
    repo: &dyn FullRepository,
    period_kind: PeriodKind,
    period: Period,
) -> RepositoryResult<SummaryReportData> {
    let entries = repo
        .list_entries(EntryFilter::date_range(period.start, period.end))
        .await?;
    let labels = label_index(repo).await?;
    let category_rows = aggregate(&entries, &period, GroupBy::Category, &labels);
    let activity_rows = aggregate(&entries, &period, GroupBy::Activity, &labels);
    let total = total_minutes(&category_rows);
    Ok(SummaryReportData {
        period_kind,
        period,
        category_rows,
        activity_rows,
        total_minutes: total,
    })
}

/// Summary report for the week containing `anchor`, honoring the
/// configured week start.
pub async fn weekly_report(
    repo: &dyn FullRepository,
    anchor: NaiveDate,
) -> RepositoryResult<SummaryReportData> {
    let settings = repo.get_settings().await?;
    let period = Period::week_containing(anchor, settings.week_start);
    report_for_period(repo, PeriodKind::Week, period).await
}

/// Summary report for the calendar month containing `anchor`.
pub async fn monthly_report(
    repo: &dyn FullRepository,
    anchor: NaiveDate,
) -> RepositoryResult<SummaryReportData> {
    let period = Period::month_containing(anchor);
    report_for_period(repo, PeriodKind::Month, period).await
}

async fn chart_for_period(
    repo: &dyn FullRepository,
    period: Period,
    group_by: GroupBy,
    surface: ChartSurface,
) -> RepositoryResult<PieChartData> {
    let entries = repo
        .list_entries(EntryFilter::date_range(period.start, period.end))
        .await?;
    let labels = label_index(repo).await?;
    // Zero-total rows earn neither a slice nor a legend line.
    let rows: Vec<_> = aggregate(&entries, &period, group_by, &labels)
        .into_iter()
        .filter(|row| row.total_minutes > 0)
        .collect();
    Ok(compute_pie_chart(&rows, surface))
}

/// Pie chart draw-plan for a single day.
pub async fn daily_chart(
    repo: &dyn FullRepository,
    day: NaiveDate,
    group_by: GroupBy,
    surface: ChartSurface,
) -> RepositoryResult<PieChartData> {
    chart_for_period(repo, Period::single_day(day), group_by, surface).await
}

/// Pie chart draw-plan for the week containing `anchor`.
pub async fn weekly_chart(
    repo: &dyn FullRepository,
    anchor: NaiveDate,
    group_by: GroupBy,
    surface: ChartSurface,
) -> RepositoryResult<PieChartData> {
    let settings = repo.get_settings().await?;
    let period = Period::week_containing(anchor, settings.week_start);
    chart_for_period(repo, period, group_by, surface).await
}

/// Pie chart draw-plan for the calendar month containing `anchor`.
pub async fn monthly_chart(
    repo: &dyn FullRepository,
    anchor: NaiveDate,
    group_by: GroupBy,
    surface: ChartSurface,
) -> RepositoryResult<PieChartData> {
    let period = Period::month_containing(anchor);
    chart_for_period(repo, period, group_by, surface).await
}

/// Export entries as CSV, optionally restricted to an inclusive date range.
pub async fn export_csv(
    repo: &dyn FullRepository,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> RepositoryResult<String> {
    let filter = EntryFilter {
        date_from: from,
        date_to: to,
        ..Default::default()
    };
    let entries = repo.list_entries(filter).await?;
    let labels = label_index(repo).await?;
    Ok(entries_to_csv(&entries, &labels))
}
