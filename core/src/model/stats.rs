use serde::{Deserialize, Serialize};

/// Derived statistics for one habit. Recomputed on demand, never persisted.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_completions: u32,
    /// Percentage of the displayed month's days completed, 0..=100.
    pub monthly_rate: u8,
}
