use serde::{Deserialize, Serialize};

/// Totals, maximum and streak for one account's full history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsDto {
    pub total_score: u64,
    pub max_score: u64,
    pub streak_days: u32,
    pub last_play_date: Option<String>,
    /// True when remote history could not be read and the cached streak
    /// (with zero totals) is shown instead.
    pub from_cache: bool,
}

/// Streak alone, for the instant pre-reconciliation display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakDto {
    pub days: u32,
    pub last_play_date: Option<String>,
}

/// Points earned on one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPointDto {
    pub date: String,
    pub points: u64,
    pub session_count: usize,
}
