use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::Value;

use crate::shared::{AccountId, SessionKey};

use super::GameSession;

/// Sessions grouped by local calendar date.
///
/// A derived view over the owner's session collection; each session belongs
/// to exactly one bucket, determined by the local date stamped when it was
/// recorded.
#[derive(Debug, Clone, Default)]
pub struct DailyBuckets {
    buckets: BTreeMap<NaiveDate, Vec<GameSession>>,
}

impl DailyBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a full history from its remote JSON form:
    /// `{ "YYYY-MM-DD": { "<key>": { ...session fields... }, ... }, ... }`.
    ///
    /// Buckets with unparseable date keys are skipped; sessions inside a
    /// valid bucket decode leniently (see `GameSession::from_remote_value`).
    pub fn from_remote_value(owner_id: &AccountId, value: &Value) -> Self {
        let mut history = Self::new();

        let Some(days) = value.as_object() else {
            return history;
        };

        for (date_key, sessions) in days {
            let Ok(date) = NaiveDate::parse_from_str(date_key, "%Y-%m-%d") else {
                log::warn!("Skipping history bucket with invalid date key: {}", date_key);
                continue;
            };

            let Some(entries) = sessions.as_object() else {
                continue;
            };

            for (session_key, raw) in entries {
                history.insert(GameSession::from_remote_value(
                    SessionKey::from_string(session_key),
                    owner_id.clone(),
                    date,
                    raw,
                ));
            }
        }

        history
    }

    pub fn insert(&mut self, session: GameSession) {
        self.buckets
            .entry(session.local_date())
            .or_default()
            .push(session);
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of distinct play dates.
    pub fn day_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn session_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Distinct play dates, most recent first.
    pub fn dates_desc(&self) -> Vec<NaiveDate> {
        self.buckets.keys().rev().copied().collect()
    }

    pub fn sessions_on(&self, date: NaiveDate) -> &[GameSession] {
        self.buckets.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter_sessions(&self) -> impl Iterator<Item = &GameSession> {
        self.buckets.values().flatten()
    }

    /// Iterate buckets in ascending date order.
    pub fn iter_days(&self) -> impl Iterator<Item = (NaiveDate, &[GameSession])> {
        self.buckets.iter().map(|(d, s)| (*d, s.as_slice()))
    }
}
