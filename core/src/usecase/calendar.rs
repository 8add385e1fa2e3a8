use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate};

use crate::model::calendar::{CalendarCell, CalendarGrid, GRID_CELLS, WEEKDAY_HEADERS};
use crate::time::YearMonth;

/// Lays out `month` as 42 cells, Sunday first.
///
/// Leading cells are the tail of the previous month, trailing cells the head
/// of the next one; neither is ever flagged as today or completed. With no
/// habit selected pass `None` and every cell is left open.
///
/// The trailing filler count is clamped at zero. Gregorian months never need
/// more than six rows, so the clamp only matters for inputs that cannot occur.
/// Filler days outside chrono's representable range are skipped, so the grid
/// of the very first or last representable month is shorter than 42 cells.
pub fn build_grid(
    month: YearMonth,
    completions: Option<&BTreeSet<NaiveDate>>,
    today: NaiveDate,
) -> CalendarGrid {
    let first = month.first_day();
    let first_weekday = u64::from(first.weekday().num_days_from_sunday());
    let days_in_month = month.days();

    let mut cells = Vec::with_capacity(GRID_CELLS);

    // Previous month tail, oldest first.
    for back in (1..=first_weekday).rev() {
        if let Some(date) = first.checked_sub_days(Days::new(back)) {
            cells.push(filler(date));
        }
    }

    for day in 1..=days_in_month {
        let Some(date) = month.date(day) else { continue };
        cells.push(CalendarCell {
            date,
            day,
            in_current_month: true,
            is_today: date == today,
            is_completed: completions.is_some_and(|set| set.contains(&date)),
        });
    }

    let trailing = GRID_CELLS.saturating_sub(cells.len()) as u64;
    let next_first = first.checked_add_days(Days::new(u64::from(days_in_month)));
    if let Some(next_first) = next_first {
        for offset in 0..trailing {
            if let Some(date) = next_first.checked_add_days(Days::new(offset)) {
                cells.push(filler(date));
            }
        }
    }

    CalendarGrid {
        month,
        headers: WEEKDAY_HEADERS,
        cells,
    }
}

fn filler(date: NaiveDate) -> CalendarCell {
    CalendarCell {
        date,
        day: date.day(),
        in_current_month: false,
        is_today: false,
        is_completed: false,
    }
}
