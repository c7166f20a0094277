pub mod chart;
pub mod summary;
