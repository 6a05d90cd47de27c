use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate, Utc};
use log::{info, warn};

use posewave_domain::events::{EventBus, StreakRefreshed};
use posewave_domain::local_state::{CachedStreak, LocalStateRepository};
use posewave_domain::scoring::ScoreSummary;
use posewave_domain::session::SessionHistoryRepository;
use posewave_domain::shared::{AccountId, DomainError};
use posewave_domain::streak::PlayStreak;

use crate::application::dtos::{StatsDto, StreakDto, TrendPointDto};

/// Reads the remote history and derives totals, maximum and streak.
///
/// The streak is recomputed from scratch on every read and mirrored into
/// the on-device cache, which [`cached_streak`](Self::cached_streak) serves
/// for instant display before the authoritative numbers arrive.
pub struct StatsService {
    history_repo: Arc<dyn SessionHistoryRepository>,
    local_state: Arc<dyn LocalStateRepository>,
    event_bus: Arc<dyn EventBus>,
}

impl StatsService {
    pub fn new(
        history_repo: Arc<dyn SessionHistoryRepository>,
        local_state: Arc<dyn LocalStateRepository>,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            history_repo,
            local_state,
            event_bus,
        }
    }

    pub async fn stats(&self, owner_id: &AccountId) -> Result<StatsDto, DomainError> {
        self.stats_at(owner_id, Local::now().date_naive()).await
    }

    /// Compute stats against an explicit "today" (testing and midnight
    /// rollover handling in the presentation layer).
    pub async fn stats_at(
        &self,
        owner_id: &AccountId,
        today: NaiveDate,
    ) -> Result<StatsDto, DomainError> {
        let history = match self.history_repo.load_history(owner_id).await {
            Ok(history) => history,
            Err(e) => {
                // Display path: fall back to the cache instead of failing
                warn!("Falling back to cached streak, history read failed: {}", e);
                let cached = self.local_state.cached_streak().await?.unwrap_or(CachedStreak {
                    days: 0,
                    last_play_date: None,
                });
                return Ok(StatsDto {
                    total_score: 0,
                    max_score: 0,
                    streak_days: cached.days,
                    last_play_date: cached
                        .last_play_date
                        .map(|d| d.format("%Y-%m-%d").to_string()),
                    from_cache: true,
                });
            }
        };

        let summary = ScoreSummary::summarize(&history);
        let streak = PlayStreak::calculate(&history, today);

        // The authoritative recomputation overwrites whatever was cached
        if let Err(e) = self.local_state.store_streak(&CachedStreak::from(streak)).await {
            warn!("Failed to refresh streak cache: {}", e);
        }

        self.event_bus
            .publish(Box::new(StreakRefreshed {
                owner_id: owner_id.clone(),
                days: streak.days(),
                occurred_at: Utc::now(),
            }))
            .await?;

        info!(
            "Stats for {}: total={} max={} streak={}",
            owner_id,
            summary.total(),
            summary.max(),
            streak.days()
        );

        Ok(StatsDto {
            total_score: summary.total(),
            max_score: summary.max(),
            streak_days: streak.days(),
            last_play_date: streak
                .last_play_date()
                .map(|d| d.format("%Y-%m-%d").to_string()),
            from_cache: false,
        })
    }

    /// Last cached streak, for instant display while `stats` is in flight.
    pub async fn cached_streak(&self) -> Result<StreakDto, DomainError> {
        let cached = self.local_state.cached_streak().await?.unwrap_or(CachedStreak {
            days: 0,
            last_play_date: None,
        });

        Ok(StreakDto {
            days: cached.days,
            last_play_date: cached
                .last_play_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
        })
    }

    /// Points per day over the last `days` calendar days, oldest first.
    /// Days without play are included with zeros.
    pub async fn daily_trend(
        &self,
        owner_id: &AccountId,
        days: u32,
    ) -> Result<Vec<TrendPointDto>, DomainError> {
        self.daily_trend_at(owner_id, days, Local::now().date_naive())
            .await
    }

    pub async fn daily_trend_at(
        &self,
        owner_id: &AccountId,
        days: u32,
        today: NaiveDate,
    ) -> Result<Vec<TrendPointDto>, DomainError> {
        let history = self.history_repo.load_history(owner_id).await?;

        let mut trend = Vec::with_capacity(days as usize);
        for offset in (0..days as i64).rev() {
            let date = today - Duration::days(offset);
            let sessions = history.sessions_on(date);
            trend.push(TrendPointDto {
                date: date.format("%Y-%m-%d").to_string(),
                points: sessions.iter().map(|s| s.score() as u64).sum(),
                session_count: sessions.len(),
            });
        }

        Ok(trend)
    }
}
