pub mod calendar;
pub mod stats;
