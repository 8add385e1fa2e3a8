use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::HabitError;
use crate::model::calendar::CalendarGrid;
use crate::model::data::{AppData, Backup};
use crate::model::habit::{Habit, HabitId};
use crate::model::stats::StatsSummary;
use crate::repository::HabitRepository;
use crate::service::dto::HabitDto;
use crate::time::YearMonth;
use crate::usecase::calendar::build_grid;
use crate::usecase::stats::compute_stats_for;

/// Whether the caller has already confirmed a destructive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Pending,
    Granted,
}

impl Confirmation {
    pub fn from_flag(granted: bool) -> Self {
        if granted {
            Confirmation::Granted
        } else {
            Confirmation::Pending
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// Nothing changed; ask the user about this habit and call again.
    NeedsConfirmation(Habit),
    Deleted(Habit),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The payload is valid but would replace the current habits.
    NeedsConfirmation { incoming: usize, existing: usize },
    Imported { habits: usize },
}

/// Owns the application document and writes it back after every change.
pub struct HabitService<R: HabitRepository> {
    repo: R,
    data: AppData,
}

impl<R: HabitRepository> HabitService<R> {
    pub fn load(repo: R) -> Result<Self> {
        let mut data = repo.load()?;
        if data.prune() {
            repo.save(&data)?;
        }
        Ok(Self { repo, data })
    }

    pub fn data(&self) -> &AppData {
        &self.data
    }

    pub fn habits(&self) -> &[Habit] {
        &self.data.habits
    }

    pub fn find(&self, id: &HabitId) -> Option<&Habit> {
        self.data.find(id)
    }

    /// Looks a habit up by full ID or by a unique ID prefix.
    pub fn resolve(&self, query: &str) -> Result<HabitId> {
        let query = query.trim();
        if let Some(habit) = self.data.habits.iter().find(|h| h.id.as_str() == query) {
            return Ok(habit.id.clone());
        }

        let mut matches = self
            .data
            .habits
            .iter()
            .filter(|h| !query.is_empty() && h.id.as_str().starts_with(query));
        match (matches.next(), matches.next()) {
            (Some(habit), None) => Ok(habit.id.clone()),
            (Some(_), Some(_)) => Err(HabitError::AmbiguousId(query.to_string()).into()),
            _ => Err(HabitError::NotFound(query.to_string()).into()),
        }
    }

    pub fn add_habit(&mut self, name: &str) -> Result<Habit> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HabitError::EmptyName.into());
        }

        let habit = Habit::new(name.to_string());
        let mut next = self.data.clone();
        next.habits.push(habit.clone());
        self.commit(next)?;

        tracing::info!(habit_id = %habit.id, name = %habit.name, "added habit");
        Ok(habit)
    }

    pub fn delete_habit(&mut self, id: &HabitId, confirmation: Confirmation) -> Result<DeleteOutcome> {
        let habit = self.require(id)?.clone();
        if confirmation == Confirmation::Pending {
            return Ok(DeleteOutcome::NeedsConfirmation(habit));
        }

        let mut next = self.data.clone();
        next.habits.retain(|h| &h.id != id);
        next.completions.remove_habit(id);
        if next.selected_habit_id.as_ref() == Some(id) {
            next.selected_habit_id = None;
        }
        self.commit(next)?;

        tracing::info!(habit_id = %id, name = %habit.name, "deleted habit");
        Ok(DeleteOutcome::Deleted(habit))
    }

    pub fn select(&mut self, id: Option<&HabitId>) -> Result<()> {
        if let Some(id) = id {
            self.require(id)?;
        }
        if self.data.selected_habit_id.as_ref() == id {
            return Ok(());
        }

        let mut next = self.data.clone();
        next.selected_habit_id = id.cloned();
        self.commit(next)
    }

    pub fn selected(&self) -> Option<&Habit> {
        self.data
            .selected_habit_id
            .as_ref()
            .and_then(|id| self.data.find(id))
    }

    /// Toggles `date` for the selected habit.
    pub fn toggle_selected(&mut self, date: NaiveDate) -> Result<bool> {
        let id = self
            .data
            .selected_habit_id
            .clone()
            .ok_or(HabitError::NoHabitSelected)?;
        self.toggle(&id, date)
    }

    pub fn toggle(&mut self, id: &HabitId, date: NaiveDate) -> Result<bool> {
        self.require(id)?;

        let mut next = self.data.clone();
        let done = next.completions.toggle(id, date);
        self.commit(next)?;

        tracing::debug!(habit_id = %id, %date, done, "toggled completion");
        Ok(done)
    }

    pub fn is_completed(&self, id: &HabitId, date: NaiveDate) -> bool {
        self.data.completions.is_completed(id, date)
    }

    pub fn stats(&self, id: &HabitId, today: NaiveDate, month: YearMonth) -> Result<StatsSummary> {
        self.require(id)?;
        Ok(compute_stats_for(&self.data.completions, id, today, month))
    }

    pub fn selected_stats(&self, today: NaiveDate, month: YearMonth) -> Option<StatsSummary> {
        self.selected()
            .map(|habit| compute_stats_for(&self.data.completions, &habit.id, today, month))
    }

    /// Month grid for the selected habit, or an unflagged grid without one.
    pub fn grid(&self, month: YearMonth, today: NaiveDate) -> CalendarGrid {
        let selected = self.selected().map(|h| h.id.clone());
        self.grid_for(selected.as_ref(), month, today)
    }

    pub fn grid_for(&self, id: Option<&HabitId>, month: YearMonth, today: NaiveDate) -> CalendarGrid {
        let completions = id.and_then(|id| self.data.completions.dates(id));
        build_grid(month, completions, today)
    }

    pub fn overview(&self, today: NaiveDate, month: YearMonth) -> Vec<HabitDto> {
        self.data
            .habits
            .iter()
            .map(|habit| {
                let stats = compute_stats_for(&self.data.completions, &habit.id, today, month);
                let selected = self.data.selected_habit_id.as_ref() == Some(&habit.id);
                let done_today = self.data.completions.is_completed(&habit.id, today);
                HabitDto::from_entity(habit, stats, selected, done_today)
            })
            .collect()
    }

    pub fn export_backup(&self, now: DateTime<Utc>) -> Backup {
        Backup::new(&self.data, now)
    }

    pub fn write_backup(&self, path: &Path, now: DateTime<Utc>) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.export_backup(now))?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), habits = self.data.habits.len(), "exported backup");
        Ok(())
    }

    /// Replaces habits, completions and the selection with the backup's.
    ///
    /// The payload is fully validated before anything is touched; an invalid
    /// payload leaves the current data as it was.
    pub fn import_backup(&mut self, json: &str, confirmation: Confirmation) -> Result<ImportOutcome> {
        let backup = Backup::parse(json)?;

        if confirmation == Confirmation::Pending && !self.data.habits.is_empty() {
            return Ok(ImportOutcome::NeedsConfirmation {
                incoming: backup.habits.len(),
                existing: self.data.habits.len(),
            });
        }

        let mut next = AppData {
            habits: backup.habits,
            completions: backup.completions,
            selected_habit_id: backup.selected_habit_id,
        };
        // Selection survives only if it names an imported habit.
        next.prune();
        let habits = next.habits.len();
        self.commit(next)?;

        tracing::info!(habits, version = ?backup.version, "imported backup");
        Ok(ImportOutcome::Imported { habits })
    }

    pub fn import_backup_file(&mut self, path: &Path, confirmation: Confirmation) -> Result<ImportOutcome> {
        let json = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        self.import_backup(&json, confirmation)
    }

    fn require(&self, id: &HabitId) -> Result<&Habit> {
        self.data
            .find(id)
            .ok_or_else(|| HabitError::NotFound(id.to_string()).into())
    }

    /// Persists `next` and only then makes it current.
    fn commit(&mut self, next: AppData) -> Result<()> {
        self.repo.save(&next)?;
        self.data = next;
        Ok(())
    }
}
