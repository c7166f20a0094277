//! # Pastel Tracker Backend
//!
//! Single-user time-tracking backend.
//!
//! Users log dated activities under categories and view periodic summaries.
//! This crate stores the entries, aggregates them into weekly/monthly totals
//! and turns those totals into a dependency-free pie-chart draw-plan that a
//! thin frontend renders onto any canvas-like surface. The REST API is served
//! via Axum.
//!
//! ## Architecture
//!
//! - [`api`]: ID newtypes and the consolidated DTO surface
//! - [`models`]: domain entities, period windows, rounding policy
//! - [`routes`]: per-endpoint data types (summary rows, chart draw-plan)
//! - [`services`]: pure computation (summary aggregation, pie geometry, CSV)
//! - [`db`]: repository pattern, storage backends and high-level operations
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! Aggregation and chart geometry are pure functions over their inputs: each
//! report request reads a fresh snapshot of the entries, computes its rows and
//! discards them after rendering. Nothing is cached between requests.

pub mod api;

pub mod db;
pub mod models;

pub mod routes;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
