use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{Datelike, Days, Duration, Months, NaiveDate, Weekday};

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// A calendar month, used as the "displayed month" cursor.
///
/// Always holds a valid first-of-month date, so every accessor is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or_else(|| anyhow!("Invalid month: {}-{:02}", year, month))
    }

    pub fn of(date: NaiveDate) -> Self {
        // Day 1 always exists for a month that contains `date`.
        Self {
            first: date - Duration::days(i64::from(date.day0())),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn days(&self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    /// Date for `day` in this month, if it exists.
    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        self.first.with_day(day)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// Previous month; stays put at the lower bound of the calendar.
    pub fn prev(&self) -> Self {
        self.shift(-1)
    }

    /// Next month; stays put at the upper bound of the calendar.
    pub fn next(&self) -> Self {
        self.shift(1)
    }

    pub fn shift(&self, months: i32) -> Self {
        let delta = Months::new(months.unsigned_abs());
        let first = if months >= 0 {
            self.first.checked_add_months(delta)
        } else {
            self.first.checked_sub_months(delta)
        };
        first.map(|first| Self { first }).unwrap_or(*self)
    }

    pub fn name(&self) -> &'static str {
        MONTH_NAMES[self.first.month0() as usize]
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.year())
    }
}

impl FromStr for YearMonth {
    type Err = anyhow::Error;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| anyhow!("Expected YYYY-MM, got '{}'", s))?;
        let year: i32 = year.parse().map_err(|_| anyhow!("Invalid year in '{}'", s))?;
        let month: u32 = month.parse().map_err(|_| anyhow!("Invalid month in '{}'", s))?;
        Self::new(year, month)
    }
}

/// Parses a day reference relative to `today`.
///
/// Accepts `today`, `yesterday`, `tomorrow`, relative offsets (`-3d`, `+1w`),
/// weekday names (the most recent one on or before `today`) and `YYYY-MM-DD`.
pub fn parse_human_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return Err(anyhow!("Empty date string"));
    }

    match input.to_lowercase().as_str() {
        "today" | "tod" => return Ok(today),
        "yesterday" | "yday" => return out_of_range(today.pred_opt(), input),
        "tomorrow" | "tom" => return out_of_range(today.succ_opt(), input),
        _ => {}
    }

    if input.starts_with('+') || input.starts_with('-') {
        if let Some(date) = parse_offset(input, today)? {
            return Ok(date);
        }
    }

    if let Ok(weekday) = parse_weekday_str(input) {
        let back = (7 + today.weekday().num_days_from_sunday() - weekday.num_days_from_sunday()) % 7;
        return out_of_range(today.checked_sub_days(Days::new(u64::from(back))), input);
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| anyhow!("Could not parse date: {}", input))
}

fn out_of_range(date: Option<NaiveDate>, input: &str) -> Result<NaiveDate> {
    date.ok_or_else(|| anyhow!("Date out of range: {}", input))
}

/// `Ok(None)` when `input` is not an offset at all.
fn parse_offset(input: &str, today: NaiveDate) -> Result<Option<NaiveDate>> {
    let (sign, rest) = input.split_at(1);
    let Some((unit_idx, _)) = rest.char_indices().last() else {
        return Ok(None);
    };
    let (num_str, unit) = rest.split_at(unit_idx);
    let Ok(count) = num_str.parse::<i64>() else {
        return Ok(None);
    };
    let count = if sign == "-" { -count } else { count };

    let offset = match unit.to_lowercase().as_str() {
        "d" => Duration::try_days(count),
        "w" => Duration::try_weeks(count),
        _ => return Err(anyhow!("Unknown unit in relative date: {}", unit)),
    };
    out_of_range(offset.and_then(|o| today.checked_add_signed(o)), input).map(Some)
}

fn parse_weekday_str(s: &str) -> Result<Weekday> {
    match s.to_lowercase().as_str() {
        "mon" | "monday" => Ok(Weekday::Mon),
        "tue" | "tuesday" => Ok(Weekday::Tue),
        "wed" | "wednesday" => Ok(Weekday::Wed),
        "thu" | "thursday" => Ok(Weekday::Thu),
        "fri" | "friday" => Ok(Weekday::Fri),
        "sat" | "saturday" => Ok(Weekday::Sat),
        "sun" | "sunday" => Ok(Weekday::Sun),
        _ => Err(anyhow!("Invalid weekday")),
    }
}
