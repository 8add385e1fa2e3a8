pub mod file;
pub mod traits;

// Re-export
pub use file::{default_data_dir, FileHabitRepository};
pub use traits::HabitRepository;
