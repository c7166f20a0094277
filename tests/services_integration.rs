//! End-to-end service layer tests over the in-memory backend.

#![cfg(feature = "local-repo")]

use chrono::NaiveDate;

use pastel_tracker::db::repositories::LocalRepository;
use pastel_tracker::db::services;
use pastel_tracker::models::{ActivityInput, CategoryInput, EntryInput, Settings, WeekStart};
use pastel_tracker::routes::chart::ChartSurface;
use pastel_tracker::routes::summary::GroupBy;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn category(name: &str) -> CategoryInput {
    CategoryInput {
        name: name.to_string(),
        color_hex: "#E6E0FF".to_string(),
        icon_key: None,
        sort_order: 0,
    }
}

async fn setup_week_of_work(repo: &LocalRepository) {
    let work = services::create_category(repo, category("Work")).await.unwrap();
    let rest = services::create_category(repo, category("Rest")).await.unwrap();
    let coding = services::create_activity(
        repo,
        ActivityInput {
            name: "Coding".to_string(),
            category_id: work.id,
            sort_order: 0,
        },
    )
    .await
    .unwrap();

    for (day, minutes, activity) in [
        ("2026-03-02", 120, Some(coding.id)),
        ("2026-03-03", 60, None),
        ("2026-03-07", 90, Some(coding.id)),
    ] {
        services::create_entry(
            repo,
            EntryInput {
                date: date(day),
                category_id: work.id,
                activity_id: activity,
                duration_minutes: minutes,
                notes: None,
            },
        )
        .await
        .unwrap();
    }
    services::create_entry(
        repo,
        EntryInput {
            date: date("2026-03-04"),
            category_id: rest.id,
            activity_id: None,
            duration_minutes: 45,
            notes: None,
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_weekly_report_groups_both_ways() {
    let repo = LocalRepository::new();
    setup_week_of_work(&repo).await;

    let report = services::weekly_report(&repo, date("2026-03-05")).await.unwrap();

    assert_eq!(report.total_minutes, 315);
    assert_eq!(report.category_rows.len(), 2);
    assert_eq!(report.category_rows[0].label, "Work");
    assert_eq!(report.category_rows[0].total_minutes, 270);
    assert_eq!(report.category_rows[1].label, "Rest");

    // Activity grouping splits out activity-less time as Unassigned but
    // still sums to the same total.
    let activity_total: u64 = report.activity_rows.iter().map(|r| r.total_minutes).sum();
    assert_eq!(activity_total, report.total_minutes);
    let labels: Vec<&str> = report.activity_rows.iter().map(|r| r.label.as_str()).collect();
    assert!(labels.contains(&"Coding"));
    assert!(labels.contains(&"Unassigned"));
}

#[tokio::test]
async fn test_week_start_setting_shifts_report_window() {
    let repo = LocalRepository::new();
    setup_week_of_work(&repo).await;

    let mut settings = services::get_settings(&repo).await.unwrap();
    settings.week_start = WeekStart::Sunday;
    services::put_settings(&repo, settings).await.unwrap();

    // 2026-03-05 is a Thursday; a Sunday-start week runs 03-01 to 03-07.
    let report = services::weekly_report(&repo, date("2026-03-05")).await.unwrap();
    assert_eq!(report.period.start, date("2026-03-01"));
    assert_eq!(report.period.end, date("2026-03-07"));
}

#[tokio::test]
async fn test_weekly_chart_legend_matches_slices() {
    let repo = LocalRepository::new();
    setup_week_of_work(&repo).await;

    let plan = services::weekly_chart(
        &repo,
        date("2026-03-05"),
        GroupBy::Category,
        ChartSurface {
            width: 400,
            height: 300,
        },
    )
    .await
    .unwrap();

    assert_eq!(plan.total_minutes, 315);
    assert_eq!(plan.slices.len(), plan.legend.len());
    for (slice, row) in plan.slices.iter().zip(plan.legend.iter()) {
        assert_eq!(slice.label, row.label);
        assert_eq!(slice.value, row.minutes);
        assert_eq!(slice.percent, row.percent);
        assert_eq!(slice.color_index, row.color_index);
    }
    // Slices are contiguous starting at twelve o'clock.
    assert_eq!(plan.slices[0].start_angle_deg, -90.0);
    let end_of_first = plan.slices[0].start_angle_deg + plan.slices[0].sweep_angle_deg;
    assert!((plan.slices[1].start_angle_deg - end_of_first).abs() < 1e-9);
}

#[tokio::test]
async fn test_monthly_chart_by_activity_drops_zero_rows() {
    let repo = LocalRepository::new();
    setup_week_of_work(&repo).await;

    let plan = services::monthly_chart(
        &repo,
        date("2026-03-15"),
        GroupBy::Activity,
        ChartSurface {
            width: 400,
            height: 400,
        },
    )
    .await
    .unwrap();

    assert!(plan.slices.iter().all(|s| s.value > 0));
    let sweep: f64 = plan.slices.iter().map(|s| s.sweep_angle_deg).sum();
    assert!((sweep - 360.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_report_json_roundtrips() {
    let repo = LocalRepository::new();
    setup_week_of_work(&repo).await;

    let report = services::weekly_report(&repo, date("2026-03-05")).await.unwrap();
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"period_kind\":\"week\""));
    assert!(json.contains("\"category_rows\""));

    let parsed: pastel_tracker::routes::summary::SummaryReportData =
        serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.total_minutes, report.total_minutes);
}

#[tokio::test]
async fn test_csv_export_after_full_crud_cycle() {
    let repo = LocalRepository::new();
    let work = services::create_category(&repo, category("Work")).await.unwrap();
    let entry = services::create_entry(
        &repo,
        EntryInput {
            date: date("2026-03-02"),
            category_id: work.id,
            activity_id: None,
            duration_minutes: 30,
            notes: None,
        },
    )
    .await
    .unwrap();
    services::delete_entry(&repo, entry.id).await.unwrap();

    let csv = services::export_csv(&repo, None, None).await.unwrap();
    assert_eq!(csv.lines().count(), 1, "only the header should remain");
}

#[tokio::test]
async fn test_settings_rounding_flows_into_reports() {
    let repo = LocalRepository::new();
    let work = services::create_category(&repo, category("Work")).await.unwrap();
    services::put_settings(
        &repo,
        Settings {
            rounding_mode: pastel_tracker::models::RoundingMode::Up,
            rounding_increment: 30,
            ..Settings::default()
        },
    )
    .await
    .unwrap();

    services::create_entry(
        &repo,
        EntryInput {
            date: date("2026-03-02"),
            category_id: work.id,
            activity_id: None,
            duration_minutes: 31,
            notes: None,
        },
    )
    .await
    .unwrap();

    let report = services::weekly_report(&repo, date("2026-03-02")).await.unwrap();
    assert_eq!(report.total_minutes, 60);
}
