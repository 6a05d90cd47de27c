use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use log::info;

use posewave_domain::account::AccountService;
use posewave_domain::events::{EventBus, SessionRecorded};
use posewave_domain::round::RoundTally;
use posewave_domain::session::{GameSession, SessionHistoryRepository};
use posewave_domain::shared::{DomainError, SessionKey};

/// Appends finished rounds to the signed-in account's remote history.
///
/// One call per game over. Failures surface to the caller; there is no
/// automatic retry here, re-prompting is a presentation concern.
pub struct SessionRecorder {
    accounts: Arc<dyn AccountService>,
    history_repo: Arc<dyn SessionHistoryRepository>,
    event_bus: Arc<dyn EventBus>,
}

impl SessionRecorder {
    pub fn new(
        accounts: Arc<dyn AccountService>,
        history_repo: Arc<dyn SessionHistoryRepository>,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            accounts,
            history_repo,
            event_bus,
        }
    }

    /// Record a tally under today's bucket (local date at call time).
    pub async fn record(&self, tally: &RoundTally) -> Result<SessionKey, DomainError> {
        self.record_on(tally, Local::now().date_naive()).await
    }

    /// Same as [`record`](Self::record) with an explicit bucket date.
    pub async fn record_on(
        &self,
        tally: &RoundTally,
        local_date: NaiveDate,
    ) -> Result<SessionKey, DomainError> {
        let account = self.accounts.current_account().ok_or_else(|| {
            DomainError::Unauthenticated(
                "No signed-in account; the finished session was dropped".to_string(),
            )
        })?;

        let session = GameSession::new(
            account.id().clone(),
            tally.score,
            tally.waves_cleared,
            tally.time_spent_seconds,
            local_date,
        )?;

        let key = self.history_repo.append(&session).await?;

        info!(
            "Recorded session {} for {}: score={} waves={} date={}",
            key,
            account.id(),
            tally.score,
            tally.waves_cleared,
            local_date
        );

        self.event_bus
            .publish(Box::new(SessionRecorded {
                owner_id: account.id().clone(),
                session_key: key.clone(),
                score: tally.score,
                waves_cleared: tally.waves_cleared,
                local_date,
                occurred_at: Utc::now(),
            }))
            .await?;

        Ok(key)
    }
}
