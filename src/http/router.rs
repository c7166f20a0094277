//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Category CRUD
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/categories/{id}",
            get(handlers::get_category)
                .patch(handlers::update_category)
                .delete(handlers::delete_category),
        )
        // Activity CRUD
        .route(
            "/activities",
            get(handlers::list_activities).post(handlers::create_activity),
        )
        .route(
            "/activities/{id}",
            get(handlers::get_activity)
                .patch(handlers::update_activity)
                .delete(handlers::delete_activity),
        )
        // Time entry CRUD and export
        .route(
            "/entries",
            get(handlers::list_entries).post(handlers::create_entry),
        )
        .route("/entries/export.csv", get(handlers::export_csv))
        .route(
            "/entries/{id}",
            get(handlers::get_entry)
                .patch(handlers::update_entry)
                .delete(handlers::delete_entry),
        )
        // Reports
        .route("/reports/weekly", get(handlers::weekly_report))
        .route("/reports/monthly", get(handlers::monthly_report))
        // Chart draw-plans
        .route("/charts/daily", get(handlers::daily_chart))
        .route("/charts/weekly", get(handlers::weekly_chart))
        .route("/charts/monthly", get(handlers::monthly_chart))
        // Settings
        .route(
            "/settings",
            get(handlers::get_settings).put(handlers::put_settings),
        );

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
