pub mod entities;
pub mod period;
pub mod rounding;

pub use entities::*;
pub use period::*;
pub use rounding::round_minutes;
