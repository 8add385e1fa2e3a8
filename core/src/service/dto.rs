use crate::model::habit::Habit;
use crate::model::stats::StatsSummary;

#[derive(Debug, Clone, PartialEq)]
pub struct HabitDto {
    pub short_id: String,
    pub name: String,
    pub selected: bool,
    pub done_today: bool,
    pub stats: StatsSummary,
}

impl HabitDto {
    pub fn from_entity(habit: &Habit, stats: StatsSummary, selected: bool, done_today: bool) -> Self {
        Self {
            short_id: habit.id.short().to_string(),
            name: habit.name.clone(),
            selected,
            done_today,
            stats,
        }
    }
}
