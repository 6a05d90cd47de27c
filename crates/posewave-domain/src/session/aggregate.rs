use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::{AccountId, DomainError, SessionKey};

/// One completed round of play.
///
/// Created exactly once at game over, appended once under the owner's
/// history, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    key: SessionKey,
    owner_id: AccountId,
    score: u32,
    waves_cleared: u32,
    time_spent_seconds: f64,
    recorded_at: DateTime<Utc>,
    local_date: NaiveDate,
}

impl GameSession {
    pub fn new(
        owner_id: AccountId,
        score: u32,
        waves_cleared: u32,
        time_spent_seconds: f64,
        local_date: NaiveDate,
    ) -> Result<Self, DomainError> {
        if !time_spent_seconds.is_finite() || time_spent_seconds < 0.0 {
            return Err(DomainError::Validation(format!(
                "Time spent must be a non-negative number, got {}",
                time_spent_seconds
            )));
        }

        Ok(Self {
            key: SessionKey::new(),
            owner_id,
            score,
            waves_cleared,
            time_spent_seconds,
            // Provisional; the remote store assigns the authoritative instant
            recorded_at: Utc::now(),
            local_date,
        })
    }

    pub fn restore(
        key: SessionKey,
        owner_id: AccountId,
        score: u32,
        waves_cleared: u32,
        time_spent_seconds: f64,
        recorded_at: DateTime<Utc>,
        local_date: NaiveDate,
    ) -> Self {
        Self {
            key,
            owner_id,
            score,
            waves_cleared,
            time_spent_seconds,
            recorded_at,
            local_date,
        }
    }

    /// Decode a session from its raw remote JSON representation.
    ///
    /// Histories accumulate whatever clients wrote over the years, so every
    /// numeric field is coerced leniently: a malformed or missing value
    /// becomes 0 and the record still counts. One corrupt entry must never
    /// abort a whole aggregation.
    pub fn from_remote_value(
        key: SessionKey,
        owner_id: AccountId,
        local_date: NaiveDate,
        value: &Value,
    ) -> Self {
        let score = coerce_u32(value.get("score"));
        let waves_cleared = coerce_u32(value.get("wavesCleared"));
        let time_spent_seconds = coerce_f64(value.get("timeSpentSeconds"));

        let recorded_at = value
            .get("timestamp")
            .and_then(parse_timestamp)
            .unwrap_or(DateTime::UNIX_EPOCH);

        Self {
            key,
            owner_id,
            score,
            waves_cleared,
            time_spent_seconds,
            recorded_at,
            local_date,
        }
    }

    /// The remote wire representation used when appending.
    pub fn to_remote_value(&self) -> Value {
        serde_json::json!({
            "score": self.score,
            "wavesCleared": self.waves_cleared,
            "timeSpentSeconds": self.time_spent_seconds,
            "timestamp": self.recorded_at.to_rfc3339(),
            "ownerId": self.owner_id.as_str(),
        })
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn owner_id(&self) -> &AccountId {
        &self.owner_id
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn waves_cleared(&self) -> u32 {
        self.waves_cleared
    }

    pub fn time_spent_seconds(&self) -> f64 {
        self.time_spent_seconds
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn local_date(&self) -> NaiveDate {
        self.local_date
    }
}

fn coerce_u32(value: Option<&Value>) -> u32 {
    match value {
        Some(v) => {
            if let Some(n) = v.as_u64() {
                n.min(u32::MAX as u64) as u32
            } else if let Some(f) = v.as_f64() {
                if f.is_finite() && f > 0.0 {
                    f.min(u32::MAX as f64) as u32
                } else {
                    0
                }
            } else {
                0
            }
        }
        None => 0,
    }
}

fn coerce_f64(value: Option<&Value>) -> f64 {
    match value.and_then(|v| v.as_f64()) {
        Some(f) if f.is_finite() && f >= 0.0 => f,
        _ => 0.0,
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    if let Some(s) = value.as_str() {
        return DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc));
    }
    // Older clients wrote epoch milliseconds
    value.as_i64().and_then(DateTime::from_timestamp_millis)
}
