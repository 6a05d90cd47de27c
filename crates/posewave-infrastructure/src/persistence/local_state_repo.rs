use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::warn;
use sqlx::{Row, SqlitePool};

use posewave_domain::local_state::{CachedStreak, LocalStateRepository};
use posewave_domain::shared::DomainError;

const KEY_STREAK_DAYS: &str = "streak.days";
const KEY_LAST_PLAY_DATE: &str = "streak.last_play_date";
const KEY_LEGACY_SPENT: &str = "legacy.spent_points";

/// Key-value cache in the on-device SQLite file.
pub struct SqliteLocalStateRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteLocalStateRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let row = sqlx::query("SELECT value FROM local_state WHERE key = ?1")
            .bind(key)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT OR REPLACE INTO local_state (key, value, updated_at)
             VALUES (?1, ?2, datetime('now'))",
        )
        .bind(key)
        .bind(value)
        .execute(&*self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM local_state WHERE key = ?1")
            .bind(key)
            .execute(&*self.pool)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl LocalStateRepository for SqliteLocalStateRepository {
    async fn cached_streak(&self) -> Result<Option<CachedStreak>, DomainError> {
        let Some(days) = self.get(KEY_STREAK_DAYS).await? else {
            return Ok(None);
        };

        let days: u32 = match days.parse() {
            Ok(days) => days,
            Err(_) => {
                warn!("[cache] discarding unparseable streak value: {}", days);
                return Ok(None);
            }
        };

        let last_play_date = self
            .get(KEY_LAST_PLAY_DATE)
            .await?
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok());

        Ok(Some(CachedStreak {
            days,
            last_play_date,
        }))
    }

    async fn store_streak(&self, streak: &CachedStreak) -> Result<(), DomainError> {
        self.set(KEY_STREAK_DAYS, &streak.days.to_string()).await?;
        match streak.last_play_date {
            Some(date) => {
                self.set(KEY_LAST_PLAY_DATE, &date.format("%Y-%m-%d").to_string())
                    .await
            }
            None => self.delete(KEY_LAST_PLAY_DATE).await,
        }
    }

    async fn legacy_spent_points(&self) -> Result<Option<i64>, DomainError> {
        Ok(self
            .get(KEY_LEGACY_SPENT)
            .await?
            .and_then(|s| s.parse::<i64>().ok()))
    }

    async fn clear_legacy_spent_points(&self) -> Result<(), DomainError> {
        self.delete(KEY_LEGACY_SPENT).await
    }
}
