//! Shared state for the tracker API.
//!
//! One [`AppState`] is built at startup and cloned into every handler by
//! axum. It carries the storage backend behind [`FullRepository`], so the
//! same router serves both the in-memory and the SQLite configuration.

use std::sync::Arc;

use crate::db::repository::FullRepository;

/// Handler state: the repository the service functions run against.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn FullRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self { repository }
    }
}
