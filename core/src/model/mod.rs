pub mod calendar;
pub mod completion;
pub mod data;
pub mod habit;
pub mod stats;
