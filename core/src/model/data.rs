use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HabitError;
use crate::model::completion::CompletionStore;
use crate::model::habit::{Habit, HabitId};

pub const BACKUP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything the application persists between runs.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppData {
    pub habits: Vec<Habit>,
    pub completions: CompletionStore,
    pub selected_habit_id: Option<HabitId>,
}

impl AppData {
    pub fn find(&self, id: &HabitId) -> Option<&Habit> {
        self.habits.iter().find(|h| &h.id == id)
    }

    /// Drops a dangling selection and completion sets without a habit.
    /// Returns true when anything was removed.
    pub fn prune(&mut self) -> bool {
        let known: HashSet<HabitId> = self.habits.iter().map(|h| h.id.clone()).collect();
        let mut changed = false;

        if let Some(selected) = &self.selected_habit_id {
            if !known.contains(selected) {
                tracing::warn!(habit_id = %selected, "discarding selection of unknown habit");
                self.selected_habit_id = None;
                changed = true;
            }
        }

        let before = self.completions.habit_ids().count();
        self.completions.retain_habits(|id| known.contains(id));
        changed |= self.completions.habit_ids().count() != before;

        changed
    }
}

/// Exported backup document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_date: Option<DateTime<Utc>>,
    pub habits: Vec<Habit>,
    pub completions: CompletionStore,
    #[serde(default)]
    pub selected_habit_id: Option<HabitId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackupPayload {
    version: Option<String>,
    export_date: Option<DateTime<Utc>>,
    habits: Option<Vec<Habit>>,
    completions: Option<CompletionStore>,
    #[serde(default)]
    selected_habit_id: Option<HabitId>,
}

impl Backup {
    pub fn new(data: &AppData, exported_at: DateTime<Utc>) -> Self {
        Self {
            version: Some(BACKUP_VERSION.to_string()),
            export_date: Some(exported_at),
            habits: data.habits.clone(),
            completions: data.completions.clone(),
            selected_habit_id: data.selected_habit_id.clone(),
        }
    }

    /// Parses and validates a backup document. Nothing is applied here.
    pub fn parse(json: &str) -> Result<Self, HabitError> {
        let payload: BackupPayload = serde_json::from_str(json)
            .map_err(|e| HabitError::InvalidBackup(format!("malformed JSON: {}", e)))?;

        let habits = payload
            .habits
            .ok_or_else(|| HabitError::InvalidBackup("missing 'habits' field".to_string()))?;
        let completions = payload
            .completions
            .ok_or_else(|| HabitError::InvalidBackup("missing 'completions' field".to_string()))?;

        let mut seen = HashSet::new();
        for habit in &habits {
            if habit.name.trim().is_empty() {
                return Err(HabitError::InvalidBackup(format!(
                    "habit {} has an empty name",
                    habit.id
                )));
            }
            if !seen.insert(&habit.id) {
                return Err(HabitError::InvalidBackup(format!(
                    "duplicate habit ID {}",
                    habit.id
                )));
            }
        }

        Ok(Self {
            version: payload.version,
            export_date: payload.export_date,
            habits,
            completions,
            selected_habit_id: payload.selected_habit_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_app_data_round_trip() {
        let mut data = AppData::default();
        let habit = Habit::new("Stretch".to_string());
        data.completions.toggle(&habit.id, date(2024, 1, 1));
        data.completions.toggle(&habit.id, date(2024, 1, 7));
        data.selected_habit_id = Some(habit.id.clone());
        data.habits.push(habit);

        let json = serde_json::to_string_pretty(&data).unwrap();
        assert!(json.contains("selectedHabitId"));
        let back: AppData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_app_data_missing_fields_default() {
        let data: AppData = serde_json::from_str("{}").unwrap();
        assert!(data.habits.is_empty());
        assert!(data.selected_habit_id.is_none());
    }

    #[test]
    fn test_prune_drops_orphans() {
        let habit = Habit::new("Run".to_string());
        let mut data = AppData {
            habits: vec![habit.clone()],
            completions: CompletionStore::new(),
            selected_habit_id: Some(HabitId::from("gone")),
        };
        data.completions.toggle(&habit.id, date(2024, 1, 1));
        data.completions.toggle(&HabitId::from("gone"), date(2024, 1, 1));

        assert!(data.prune());
        assert!(data.selected_habit_id.is_none());
        assert_eq!(data.completions.habit_ids().collect::<Vec<_>>(), vec![&habit.id]);
        assert!(!data.prune());
    }

    #[test]
    fn test_backup_contains_metadata() {
        let habit = Habit::new("Read".to_string());
        let data = AppData {
            selected_habit_id: Some(habit.id.clone()),
            habits: vec![habit.clone()],
            completions: CompletionStore::new(),
        };
        let now = Utc::now();
        let json = serde_json::to_value(Backup::new(&data, now)).unwrap();
        assert_eq!(json["version"], BACKUP_VERSION);
        assert!(json.get("exportDate").is_some());
        assert!(json.get("habits").is_some());
        assert!(json.get("completions").is_some());
        assert_eq!(json["selectedHabitId"], habit.id.as_str());
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        let err = Backup::parse(r#"{"habits": []}"#).unwrap_err();
        assert_eq!(err, HabitError::InvalidBackup("missing 'completions' field".to_string()));

        let err = Backup::parse(r#"{"completions": {}}"#).unwrap_err();
        assert_eq!(err, HabitError::InvalidBackup("missing 'habits' field".to_string()));

        assert!(matches!(Backup::parse("not json"), Err(HabitError::InvalidBackup(_))));
    }

    #[test]
    fn test_parse_rejects_duplicate_ids() {
        let json = r#"{
            "habits": [
                {"id": "1", "name": "A", "createdAt": "2024-01-01T00:00:00Z"},
                {"id": "1", "name": "B", "createdAt": "2024-01-01T00:00:00Z"}
            ],
            "completions": {}
        }"#;
        assert!(matches!(Backup::parse(json), Err(HabitError::InvalidBackup(_))));
    }

    #[test]
    fn test_parse_accepts_metadata_free_payload() {
        let json = r#"{
            "habits": [{"id": "1", "name": "Read", "createdAt": "2024-01-01T00:00:00Z"}],
            "completions": {"1": {"2024-01-02": true}}
        }"#;
        let backup = Backup::parse(json).unwrap();
        assert!(backup.version.is_none());
        assert!(backup.selected_habit_id.is_none());
        assert_eq!(backup.habits.len(), 1);
        assert!(backup.completions.is_completed(&HabitId::from("1"), date(2024, 1, 2)));
    }
}
