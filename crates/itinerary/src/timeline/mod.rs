//! Timeline computation for a trip day.

pub mod entry;
pub mod generator;

pub use entry::{Timeline, TimelineEntry};
pub use generator::generate;
