//! Concrete repository backends.

#[cfg(feature = "local-repo")]
pub mod local;

#[cfg(feature = "sqlite-repo")]
pub mod sqlite;

#[cfg(feature = "local-repo")]
pub use local::LocalRepository;

#[cfg(feature = "sqlite-repo")]
pub use sqlite::SqliteRepository;
