use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HabitError {
    #[error("Habit name must not be empty")]
    EmptyName,

    #[error("Habit with ID {0} not found")]
    NotFound(String),

    #[error("ID prefix '{0}' matches more than one habit")]
    AmbiguousId(String),

    #[error("No habit selected; select a habit first")]
    NoHabitSelected,

    #[error("Invalid backup: {0}")]
    InvalidBackup(String),
}
