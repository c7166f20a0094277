//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;

use super::dto::{
    ActivityListQuery, ActivityListResponse, CategoryListResponse, ChartQuery, EntryListQuery,
    EntryListResponse, ExportQuery, HealthResponse, ReportQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{ActivityId, CategoryId, EntryId, PieChartData, SummaryReportData};
use crate::db::repository::EntryFilter;
use crate::db::services as db_services;
use crate::models::{
    Activity, ActivityInput, ActivityPatch, Category, CategoryInput, CategoryPatch, EntryInput,
    EntryPatch, Settings, TimeEntry,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn anchor_date(requested: Option<NaiveDate>) -> NaiveDate {
    requested.unwrap_or_else(|| chrono::Local::now().date_naive())
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and storage is
/// reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(()) => "connected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Categories
// =============================================================================

/// GET /v1/categories
pub async fn list_categories(State(state): State<AppState>) -> HandlerResult<CategoryListResponse> {
    let categories = db_services::list_categories(state.repository.as_ref()).await?;
    let total = categories.len();
    Ok(Json(CategoryListResponse { categories, total }))
}

/// POST /v1/categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = db_services::create_category(state.repository.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /v1/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<Category> {
    let category = db_services::get_category(state.repository.as_ref(), CategoryId::new(id)).await?;
    Ok(Json(category))
}

/// PATCH /v1/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<CategoryPatch>,
) -> HandlerResult<Category> {
    let category =
        db_services::update_category(state.repository.as_ref(), CategoryId::new(id), patch).await?;
    Ok(Json(category))
}

/// DELETE /v1/categories/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    db_services::delete_category(state.repository.as_ref(), CategoryId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Activities
// =============================================================================

/// GET /v1/activities
pub async fn list_activities(
    State(state): State<AppState>,
    Query(query): Query<ActivityListQuery>,
) -> HandlerResult<ActivityListResponse> {
    let category_id = query.category_id.map(CategoryId::new);
    let activities = db_services::list_activities(state.repository.as_ref(), category_id).await?;
    let total = activities.len();
    Ok(Json(ActivityListResponse { activities, total }))
}

/// POST /v1/activities
pub async fn create_activity(
    State(state): State<AppState>,
    Json(input): Json<ActivityInput>,
) -> Result<(StatusCode, Json<Activity>), AppError> {
    let activity = db_services::create_activity(state.repository.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

/// GET /v1/activities/{id}
pub async fn get_activity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<Activity> {
    let activity = db_services::get_activity(state.repository.as_ref(), ActivityId::new(id)).await?;
    Ok(Json(activity))
}

/// PATCH /v1/activities/{id}
pub async fn update_activity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<ActivityPatch>,
) -> HandlerResult<Activity> {
    let activity =
        db_services::update_activity(state.repository.as_ref(), ActivityId::new(id), patch).await?;
    Ok(Json(activity))
}

/// DELETE /v1/activities/{id}
pub async fn delete_activity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    db_services::delete_activity(state.repository.as_ref(), ActivityId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Time entries
// =============================================================================

/// GET /v1/entries
pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<EntryListQuery>,
) -> HandlerResult<EntryListResponse> {
    let filter = EntryFilter {
        date_from: query.from,
        date_to: query.to,
        category_id: query.category_id.map(CategoryId::new),
        activity_id: query.activity_id.map(ActivityId::new),
    };
    let entries = db_services::list_entries(state.repository.as_ref(), filter).await?;
    let total = entries.len();
    Ok(Json(EntryListResponse { entries, total }))
}

/// POST /v1/entries
pub async fn create_entry(
    State(state): State<AppState>,
    Json(input): Json<EntryInput>,
) -> Result<(StatusCode, Json<TimeEntry>), AppError> {
    let entry = db_services::create_entry(state.repository.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /v1/entries/{id}
pub async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<TimeEntry> {
    let entry = db_services::get_entry(state.repository.as_ref(), EntryId::new(id)).await?;
    Ok(Json(entry))
}

/// PATCH /v1/entries/{id}
pub async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<EntryPatch>,
) -> HandlerResult<TimeEntry> {
    let entry = db_services::update_entry(state.repository.as_ref(), EntryId::new(id), patch).await?;
    Ok(Json(entry))
}

/// DELETE /v1/entries/{id}
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    db_services::delete_entry(state.repository.as_ref(), EntryId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/entries/export.csv
///
/// Export entries as a CSV download, optionally limited to a date range.
pub async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let csv = db_services::export_csv(state.repository.as_ref(), query.from, query.to).await?;
    let response = (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"time_entries.csv\"",
            ),
        ],
        csv,
    );
    Ok(response.into_response())
}

// =============================================================================
// Reports
// =============================================================================

/// GET /v1/reports/weekly
///
/// Summary report for the week containing the anchor date (today if
/// absent), honoring the configured week start.
pub async fn weekly_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> HandlerResult<SummaryReportData> {
    let anchor = anchor_date(query.date);
    let report = db_services::weekly_report(state.repository.as_ref(), anchor).await?;
    Ok(Json(report))
}

/// GET /v1/reports/monthly
pub async fn monthly_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> HandlerResult<SummaryReportData> {
    let anchor = anchor_date(query.date);
    let report = db_services::monthly_report(state.repository.as_ref(), anchor).await?;
    Ok(Json(report))
}

// =============================================================================
// Charts
// =============================================================================

/// GET /v1/charts/daily
///
/// Pie chart draw-plan for one day.
pub async fn daily_chart(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> HandlerResult<PieChartData> {
    let anchor = anchor_date(query.date);
    let plan = db_services::daily_chart(
        state.repository.as_ref(),
        anchor,
        query.group_by(),
        query.surface(),
    )
    .await?;
    Ok(Json(plan))
}

/// GET /v1/charts/weekly
pub async fn weekly_chart(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> HandlerResult<PieChartData> {
    let anchor = anchor_date(query.date);
    let plan = db_services::weekly_chart(
        state.repository.as_ref(),
        anchor,
        query.group_by(),
        query.surface(),
    )
    .await?;
    Ok(Json(plan))
}

/// GET /v1/charts/monthly
pub async fn monthly_chart(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> HandlerResult<PieChartData> {
    let anchor = anchor_date(query.date);
    let plan = db_services::monthly_chart(
        state.repository.as_ref(),
        anchor,
        query.group_by(),
        query.surface(),
    )
    .await?;
    Ok(Json(plan))
}

// =============================================================================
// Settings
// =============================================================================

/// GET /v1/settings
pub async fn get_settings(State(state): State<AppState>) -> HandlerResult<Settings> {
    let settings = db_services::get_settings(state.repository.as_ref()).await?;
    Ok(Json(settings))
}

/// PUT /v1/settings
pub async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<Settings>,
) -> HandlerResult<Settings> {
    let settings = db_services::put_settings(state.repository.as_ref(), settings).await?;
    Ok(Json(settings))
}
