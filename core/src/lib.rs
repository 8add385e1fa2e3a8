pub mod error;
pub mod model;
pub mod repository;
pub mod service;
pub mod time;
pub mod usecase;

pub use error::HabitError;
pub use model::calendar::{CalendarCell, CalendarGrid, GRID_CELLS, WEEKDAY_HEADERS};
pub use model::completion::CompletionStore;
pub use model::data::{AppData, Backup};
pub use model::habit::{Habit, HabitId};
pub use model::stats::StatsSummary;
pub use repository::{default_data_dir, FileHabitRepository, HabitRepository};
pub use service::dto::HabitDto;
pub use service::habit_service::{Confirmation, DeleteOutcome, HabitService, ImportOutcome};
pub use time::{parse_human_date, YearMonth};
pub use usecase::calendar::build_grid;
pub use usecase::stats::compute_stats;
