use chrono::NaiveDate;

use crate::time::YearMonth;

pub const GRID_CELLS: usize = 42;
pub const WEEKDAY_HEADERS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub day: u32,
    pub in_current_month: bool,
    pub is_today: bool,
    pub is_completed: bool,
}

/// A 6x7 month view, Sunday first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid {
    pub month: YearMonth,
    pub headers: [&'static str; 7],
    pub cells: Vec<CalendarCell>,
}

impl CalendarGrid {
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(7)
    }

    pub fn completed_days(&self) -> usize {
        self.cells.iter().filter(|c| c.is_completed).count()
    }
}
