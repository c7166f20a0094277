//! Service layer: pure computation behind the report endpoints.
//!
//! Everything here is a function over in-memory inputs. The database service
//! layer ([`crate::db::services`]) fetches a snapshot of the store, calls
//! into these functions and returns the result; nothing in this module
//! touches storage or performs I/O.

pub mod csv_export;

pub mod pie_chart;

pub mod summary;

pub use csv_export::entries_to_csv;
pub use pie_chart::{compute_pie_chart, palette_color, PASTEL_PALETTE};
pub use summary::{aggregate, total_minutes, LabelIndex};
