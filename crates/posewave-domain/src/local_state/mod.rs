use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::shared::DomainError;
use crate::streak::PlayStreak;

/// Last streak shown to the player, kept on-device for instant display
/// while the authoritative recomputation is in flight (or offline).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedStreak {
    pub days: u32,
    pub last_play_date: Option<NaiveDate>,
}

impl From<PlayStreak> for CachedStreak {
    fn from(streak: PlayStreak) -> Self {
        Self {
            days: streak.days(),
            last_play_date: streak.last_play_date(),
        }
    }
}

/// On-device key-value state.
///
/// Purely a fast/offline-tolerant cache plus one legacy value; the remote
/// store supersedes everything here whenever it is reachable.
#[async_trait]
pub trait LocalStateRepository: Send + Sync {
    async fn cached_streak(&self) -> Result<Option<CachedStreak>, DomainError>;

    async fn store_streak(&self, streak: &CachedStreak) -> Result<(), DomainError>;

    /// Spent-points value written by app versions that predate the remote
    /// ledger. Present at most until the one-time migration clears it.
    async fn legacy_spent_points(&self) -> Result<Option<i64>, DomainError>;

    async fn clear_legacy_spent_points(&self) -> Result<(), DomainError>;
}
