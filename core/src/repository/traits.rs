use crate::model::data::AppData;
use anyhow::Result;

/// Persistence boundary for the whole application document.
pub trait HabitRepository {
    fn load(&self) -> Result<AppData>;
    fn save(&self, data: &AppData) -> Result<()>;
}
