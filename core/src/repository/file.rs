use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde_json;

use crate::model::data::AppData;
use crate::repository::traits::HabitRepository;

const DEFAULT_FILE_NAME: &str = "habits.json";
const DEFAULT_DIR_NAME: &str = ".habitism";

/// `~/.habitism`
pub fn default_data_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home_dir.join(DEFAULT_DIR_NAME))
}

#[derive(Clone, Debug)]
pub struct FileHabitRepository {
    file_path: PathBuf,
}

impl FileHabitRepository {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut path = match base_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create data directory {}", path.display()))?;
        path.push(DEFAULT_FILE_NAME);

        let repo = FileHabitRepository { file_path: path };
        if !repo.file_path.exists() {
            tracing::info!(path = %repo.file_path.display(), "initializing empty habit store");
            repo.save(&AppData::default())?;
        }

        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl HabitRepository for FileHabitRepository {
    fn load(&self) -> Result<AppData> {
        let file = File::open(&self.file_path)
            .with_context(|| format!("Failed to open {}", self.file_path.display()))?;
        let reader = BufReader::new(file);
        let data = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse {}", self.file_path.display()))?;
        Ok(data)
    }

    fn save(&self, data: &AppData) -> Result<()> {
        // Written beside the target, then renamed over it.
        let tmp_path = self.file_path.with_extension("json.tmp");
        let file = File::create(&tmp_path)
            .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, data)?;
        writer.flush()?;
        drop(writer);

        fs::rename(&tmp_path, &self.file_path)
            .with_context(|| format!("Failed to replace {}", self.file_path.display()))?;
        tracing::debug!(habits = data.habits.len(), "saved habit store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::habit::Habit;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_new_creates_empty_document() {
        let dir = TempDir::new().unwrap();
        let repo = FileHabitRepository::new(Some(dir.path().join("nested"))).unwrap();

        assert!(repo.path().exists());
        assert_eq!(repo.load().unwrap(), AppData::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let repo = FileHabitRepository::new(Some(dir.path().to_path_buf())).unwrap();

        let mut data = AppData::default();
        let habit = Habit::new("Meditate".to_string());
        data.completions
            .toggle(&habit.id, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        data.selected_habit_id = Some(habit.id.clone());
        data.habits.push(habit);

        repo.save(&data).unwrap();
        assert_eq!(repo.load().unwrap(), data);

        // A second repository over the same directory sees the same data.
        let reopened = FileHabitRepository::new(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(reopened.load().unwrap(), data);
    }

    #[test]
    fn test_load_reports_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let repo = FileHabitRepository::new(Some(dir.path().to_path_buf())).unwrap();
        fs::write(repo.path(), "{ not json").unwrap();

        let err = repo.load().unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
