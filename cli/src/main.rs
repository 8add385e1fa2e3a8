mod logging;
mod report;
mod tui;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate, Utc};
use clap::Parser;
use habitism_core::{
    default_data_dir, parse_human_date, Confirmation, DeleteOutcome, FileHabitRepository,
    HabitId, HabitService, ImportOutcome, YearMonth,
};

#[derive(Parser)]
#[command(name = "habitism")]
#[command(about = "Track daily habits, streaks and monthly completion", long_about = None)]
struct Cli {
    /// Directory holding habits.json and logs (default: ~/.habitism)
    #[arg(long, global = true, env = "HABITISM_HOME")]
    data_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); also echoes logs to stderr
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Add a new habit (usage: add Drink water)
    Add {
        #[arg(trailing_var_arg = true, required = true)]
        name: Vec<String>,
    },
    /// List habits with their streaks
    List {
        /// Month used for the completion rate (YYYY-MM, default: current)
        #[arg(long)]
        month: Option<String>,
    },
    /// Delete a habit and all its completions
    Delete {
        /// Habit ID or unique ID prefix
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Select the habit that toggle/stats/calendar act on
    Select { id: String },
    /// Clear the current selection
    Unselect,
    /// Mark or unmark a day (today, yesterday, -2d, mon, 2024-01-31)
    Toggle {
        #[arg(default_value = "today")]
        date: String,
        /// Habit to toggle instead of the selected one
        #[arg(long)]
        habit: Option<String>,
    },
    /// Show statistics for a habit
    Stats {
        #[arg(long)]
        habit: Option<String>,
        #[arg(long)]
        month: Option<String>,
    },
    /// Show a month calendar for a habit
    Calendar {
        #[arg(long)]
        habit: Option<String>,
        #[arg(long)]
        month: Option<String>,
    },
    /// Write a backup of all habits and completions
    Export { path: PathBuf },
    /// Replace all habits and completions with a backup
    Import {
        path: PathBuf,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Open the Terminal User Interface
    Tui,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    logging::enable_logging(&data_dir, cli.log_level.as_deref(), cli.log_level.is_some() && !interactive)?;

    let repo = FileHabitRepository::new(Some(data_dir))?;
    let mut service = HabitService::load(repo)?;
    // Read the wall clock once; everything below works from this date.
    let today = Local::now().date_naive();

    match cli.command {
        Some(Commands::Add { name }) => {
            let habit = service.add_habit(&name.join(" "))?;
            println!("Habit added: {} (ID: {})", habit.name, habit.id.short());
        }
        Some(Commands::List { month }) => {
            let month = parse_month(month.as_deref(), today)?;
            report::print_habits(&service.overview(today, month), month);
        }
        Some(Commands::Delete { id, yes }) => {
            let id = service.resolve(&id)?;
            let mut outcome = service.delete_habit(&id, Confirmation::from_flag(yes))?;
            if let DeleteOutcome::NeedsConfirmation(habit) = &outcome {
                if !confirm(&format!("Delete habit '{}' and all its completions?", habit.name))? {
                    println!("Aborted.");
                    return Ok(());
                }
                outcome = service.delete_habit(&id, Confirmation::Granted)?;
            }
            if let DeleteOutcome::Deleted(habit) = outcome {
                println!("Habit deleted: {}", habit.name);
            }
        }
        Some(Commands::Select { id }) => {
            let id = service.resolve(&id)?;
            service.select(Some(&id))?;
            if let Some(habit) = service.selected() {
                println!("Selected: {}", habit.name);
            }
        }
        Some(Commands::Unselect) => {
            service.select(None)?;
            println!("Selection cleared.");
        }
        Some(Commands::Toggle { date, habit }) => {
            let date = parse_human_date(&date, today)?;
            let done = match resolve_habit(&service, habit.as_deref())? {
                Some(id) => service.toggle(&id, date)?,
                None => service.toggle_selected(date)?,
            };
            let mark = if done { "done" } else { "not done" };
            println!("{}: {}", date.format("%Y-%m-%d (%a)"), mark);
        }
        Some(Commands::Stats { habit, month }) => {
            let month = parse_month(month.as_deref(), today)?;
            let id = require_habit(&service, habit.as_deref())?;
            let stats = service.stats(&id, today, month)?;
            if let Some(habit) = service.find(&id) {
                report::print_stats(habit, &stats, month);
            }
        }
        Some(Commands::Calendar { habit, month }) => {
            let month = parse_month(month.as_deref(), today)?;
            let id = resolve_habit(&service, habit.as_deref())?
                .or_else(|| service.selected().map(|h| h.id.clone()));
            let grid = service.grid_for(id.as_ref(), month, today);
            report::print_calendar(&grid, id.as_ref().and_then(|id| service.find(id)));
        }
        Some(Commands::Export { path }) => {
            service.write_backup(&path, Utc::now())?;
            println!("Exported {} habits to {}", service.habits().len(), path.display());
        }
        Some(Commands::Import { path, yes }) => {
            let mut outcome = service.import_backup_file(&path, Confirmation::from_flag(yes))?;
            if let ImportOutcome::NeedsConfirmation { incoming, existing } = outcome {
                let prompt = format!(
                    "Replace {} existing habits with {} from the backup?",
                    existing, incoming
                );
                if !confirm(&prompt)? {
                    println!("Aborted.");
                    return Ok(());
                }
                outcome = service.import_backup_file(&path, Confirmation::Granted)?;
            }
            if let ImportOutcome::Imported { habits } = outcome {
                println!("Imported {} habits from {}", habits, path.display());
            }
        }
        Some(Commands::Tui) | None => {
            tui::run(service, today)?;
        }
    }
    Ok(())
}

fn parse_month(month: Option<&str>, today: NaiveDate) -> Result<YearMonth> {
    match month {
        Some(m) => m.parse(),
        None => Ok(YearMonth::of(today)),
    }
}

fn resolve_habit(
    service: &HabitService<FileHabitRepository>,
    query: Option<&str>,
) -> Result<Option<HabitId>> {
    query.map(|q| service.resolve(q)).transpose()
}

/// The habit named on the command line, falling back to the selection.
fn require_habit(
    service: &HabitService<FileHabitRepository>,
    query: Option<&str>,
) -> Result<HabitId> {
    match resolve_habit(service, query)? {
        Some(id) => Ok(id),
        None => service
            .selected()
            .map(|h| h.id.clone())
            .ok_or_else(|| anyhow!(habitism_core::HabitError::NoHabitSelected)),
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
