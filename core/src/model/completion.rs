use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::model::habit::HabitId;

/// Per-habit sets of completed calendar days.
///
/// Serialized as `{ "<habit id>": ["YYYY-MM-DD", ...] }`. The older
/// `{ "<habit id>": { "YYYY-MM-DD": true } }` layout is still accepted when
/// reading.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct CompletionStore {
    sets: BTreeMap<HabitId, BTreeSet<NaiveDate>>,
}

impl CompletionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_completed(&self, habit_id: &HabitId, date: NaiveDate) -> bool {
        self.sets
            .get(habit_id)
            .is_some_and(|dates| dates.contains(&date))
    }

    /// Flips `date` for the habit and returns whether it is now completed.
    pub fn toggle(&mut self, habit_id: &HabitId, date: NaiveDate) -> bool {
        let dates = self.sets.entry(habit_id.clone()).or_default();
        if dates.remove(&date) {
            false
        } else {
            dates.insert(date);
            true
        }
    }

    pub fn remove_habit(&mut self, habit_id: &HabitId) {
        self.sets.remove(habit_id);
    }

    /// Completed days in ascending order.
    pub fn all_dates(&self, habit_id: &HabitId) -> Vec<NaiveDate> {
        self.sets
            .get(habit_id)
            .map(|dates| dates.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn dates(&self, habit_id: &HabitId) -> Option<&BTreeSet<NaiveDate>> {
        self.sets.get(habit_id)
    }

    pub fn habit_ids(&self) -> impl Iterator<Item = &HabitId> {
        self.sets.keys()
    }

    /// Drops every set whose habit does not satisfy `keep`.
    pub fn retain_habits<F>(&mut self, mut keep: F)
    where
        F: FnMut(&HabitId) -> bool,
    {
        self.sets.retain(|id, _| keep(id));
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DateSetRepr {
    List(BTreeSet<NaiveDate>),
    Flags(BTreeMap<NaiveDate, bool>),
}

impl DateSetRepr {
    fn into_set(self) -> BTreeSet<NaiveDate> {
        match self {
            DateSetRepr::List(dates) => dates,
            DateSetRepr::Flags(flags) => flags
                .into_iter()
                .filter_map(|(date, done)| done.then_some(date))
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for CompletionStore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<HabitId, DateSetRepr>::deserialize(deserializer)?;
        Ok(Self {
            sets: raw
                .into_iter()
                .map(|(id, repr)| (id, repr.into_set()))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_unknown_habit_is_not_completed() {
        let store = CompletionStore::new();
        let id = HabitId::from("missing");
        assert!(!store.is_completed(&id, date(2024, 1, 1)));
        assert!(store.all_dates(&id).is_empty());
        assert!(store.dates(&id).is_none());
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut store = CompletionStore::new();
        let id = HabitId::from("h1");
        let day = date(2024, 1, 1);

        assert!(store.toggle(&id, day));
        assert!(store.is_completed(&id, day));
        assert!(!store.toggle(&id, day));
        assert!(!store.is_completed(&id, day));
        assert!(store.all_dates(&id).is_empty());
    }

    #[test]
    fn test_all_dates_sorted() {
        let mut store = CompletionStore::new();
        let id = HabitId::from("h1");
        store.toggle(&id, date(2024, 1, 5));
        store.toggle(&id, date(2023, 12, 31));
        store.toggle(&id, date(2024, 1, 1));

        assert_eq!(
            store.all_dates(&id),
            vec![date(2023, 12, 31), date(2024, 1, 1), date(2024, 1, 5)]
        );
    }

    #[test]
    fn test_remove_habit_is_idempotent() {
        let mut store = CompletionStore::new();
        let id = HabitId::from("h1");
        store.toggle(&id, date(2024, 1, 1));

        store.remove_habit(&id);
        store.remove_habit(&id);
        store.remove_habit(&HabitId::from("never-existed"));

        assert!(!store.is_completed(&id, date(2024, 1, 1)));
        assert_eq!(store.habit_ids().count(), 0);
    }

    #[test]
    fn test_serializes_as_sorted_lists() {
        let mut store = CompletionStore::new();
        let id = HabitId::from("h1");
        store.toggle(&id, date(2024, 1, 2));
        store.toggle(&id, date(2024, 1, 1));

        let json = serde_json::to_string(&store).unwrap();
        assert_eq!(json, r#"{"h1":["2024-01-01","2024-01-02"]}"#);

        let back: CompletionStore = serde_json::from_str(&json).unwrap();
        assert_eq!(back, store);
    }

    #[test]
    fn test_reads_legacy_flag_layout() {
        let json = r#"{"1704067200000":{"2024-01-01":true,"2024-01-03":true,"2024-01-02":false}}"#;
        let store: CompletionStore = serde_json::from_str(json).unwrap();
        let id = HabitId::from("1704067200000");

        assert_eq!(store.all_dates(&id), vec![date(2024, 1, 1), date(2024, 1, 3)]);
    }

    #[test]
    fn test_rejects_malformed_dates() {
        let json = r#"{"h1":["2024-02-30"]}"#;
        assert!(serde_json::from_str::<CompletionStore>(json).is_err());
    }

    #[test]
    fn test_retain_habits() {
        let mut store = CompletionStore::new();
        let keep = HabitId::from("keep");
        let drop = HabitId::from("drop");
        store.toggle(&keep, date(2024, 1, 1));
        store.toggle(&drop, date(2024, 1, 1));

        store.retain_habits(|id| *id == keep);

        assert!(store.is_completed(&keep, date(2024, 1, 1)));
        assert!(!store.is_completed(&drop, date(2024, 1, 1)));
    }
}
