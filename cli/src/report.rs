use habitism_core::{CalendarGrid, Habit, HabitDto, StatsSummary, YearMonth};
use tabled::builder::Builder;
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct HabitRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Habit")]
    name: String,
    #[tabled(rename = "Today")]
    today: &'static str,
    #[tabled(rename = "Streak")]
    streak: u32,
    #[tabled(rename = "Best")]
    best: u32,
    #[tabled(rename = "Total")]
    total: u32,
    #[tabled(rename = "Month")]
    month: String,
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

pub fn print_habits(habits: &[HabitDto], month: YearMonth) {
    if habits.is_empty() {
        println!("No habits yet. Add one with `habitism add <name>`.");
        return;
    }

    let rows: Vec<HabitRow> = habits
        .iter()
        .map(|h| HabitRow {
            marker: if h.selected { "*" } else { "" },
            id: h.short_id.clone(),
            name: h.name.clone(),
            today: if h.done_today { "✔" } else { "☐" },
            streak: h.stats.current_streak,
            best: h.stats.longest_streak,
            total: h.stats.total_completions,
            month: format!("{}%", h.stats.monthly_rate),
        })
        .collect();

    println!("\x1b[1;36m{}\x1b[0m", month);
    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    println!("{}", table);
}

pub fn print_stats(habit: &Habit, stats: &StatsSummary, month: YearMonth) {
    let rows = vec![
        StatRow {
            metric: "Current streak",
            value: format!("{} days in a row", stats.current_streak),
        },
        StatRow {
            metric: "Longest streak",
            value: format!("{} days", stats.longest_streak),
        },
        StatRow {
            metric: "Total completions",
            value: format!("{} times", stats.total_completions),
        },
        StatRow {
            metric: "Completion rate",
            value: format!("{}% in {}", stats.monthly_rate, month),
        },
    ];

    println!("\x1b[1;36m{}\x1b[0m", habit.name);
    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    println!("{}", table);
}

/// Prints the month grid. Filler days are parenthesised, completed days
/// carry a check mark and today is starred.
pub fn print_calendar(grid: &CalendarGrid, habit: Option<&Habit>) {
    let title = match habit {
        Some(h) => format!("{} · {}", grid.month, h.name),
        None => format!("{} · no habit selected", grid.month),
    };
    println!("\x1b[1;36m{}\x1b[0m", title);

    let mut builder = Builder::default();
    builder.push_record(grid.headers.iter().map(|h| h.to_string()));
    for week in grid.weeks() {
        builder.push_record(week.iter().map(|cell| {
            if !cell.in_current_month {
                return format!("({})", cell.day);
            }
            let mut label = cell.day.to_string();
            if cell.is_completed {
                label.push('✔');
            }
            if cell.is_today {
                label.push('*');
            }
            label
        }));
    }

    let mut table = builder.build();
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    println!("{}", table);
}
