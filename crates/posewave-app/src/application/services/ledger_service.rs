use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};

use posewave_domain::events::{EventBus, PointsRedeemed};
use posewave_domain::ledger::{LedgerRepository, PointsLedger};
use posewave_domain::local_state::LocalStateRepository;
use posewave_domain::scoring::ScoreSummary;
use posewave_domain::session::SessionHistoryRepository;
use posewave_domain::shared::{AccountId, DomainError};

use crate::application::dtos::LedgerDto;

/// Total / spent / available bookkeeping over the remote spent counter.
///
/// Installs that predate the remote counter carry a locally cached legacy
/// value; the first read that finds no remote counter migrates the legacy
/// value up and clears it. Two devices migrating concurrently race, and
/// the last writer wins; the counter is best-effort by design.
pub struct LedgerService {
    history_repo: Arc<dyn SessionHistoryRepository>,
    ledger_repo: Arc<dyn LedgerRepository>,
    local_state: Arc<dyn LocalStateRepository>,
    event_bus: Arc<dyn EventBus>,
}

impl LedgerService {
    pub fn new(
        history_repo: Arc<dyn SessionHistoryRepository>,
        ledger_repo: Arc<dyn LedgerRepository>,
        local_state: Arc<dyn LocalStateRepository>,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            history_repo,
            ledger_repo,
            local_state,
            event_bus,
        }
    }

    /// Ledger for display. Read failures degrade to zeros rather than
    /// blocking rendering.
    pub async fn ledger(&self, owner_id: &AccountId) -> Result<LedgerDto, DomainError> {
        let ledger = match self.load(owner_id).await {
            Ok(ledger) => ledger,
            Err(e) => {
                warn!("Ledger read degraded to zeros: {}", e);
                PointsLedger::default()
            }
        };

        Ok(LedgerDto {
            total: ledger.total(),
            spent: ledger.spent(),
            available: ledger.available(),
        })
    }

    /// Spend points on a reward. Unlike the display path this propagates
    /// errors, so the caller can offer a retry.
    pub async fn redeem(&self, owner_id: &AccountId, points: u64) -> Result<LedgerDto, DomainError> {
        let mut ledger = self.load(owner_id).await?;

        if points > ledger.available() {
            return Err(DomainError::Validation(format!(
                "Cannot redeem {} points, only {} available",
                points,
                ledger.available()
            )));
        }

        ledger.redeem(points);
        self.ledger_repo
            .write_spent(owner_id, ledger.spent())
            .await?;

        info!(
            "Redeemed {} points for {}; spent now {}",
            points,
            owner_id,
            ledger.spent()
        );

        self.event_bus
            .publish(Box::new(PointsRedeemed {
                owner_id: owner_id.clone(),
                points,
                spent_after: ledger.spent(),
                occurred_at: Utc::now(),
            }))
            .await?;

        Ok(LedgerDto {
            total: ledger.total(),
            spent: ledger.spent(),
            available: ledger.available(),
        })
    }

    /// Overwrite the spent counter with an externally supplied value,
    /// clamped to >= 0 before anything is persisted.
    pub async fn overwrite_spent(
        &self,
        owner_id: &AccountId,
        raw_spent: i64,
    ) -> Result<(), DomainError> {
        self.ledger_repo
            .write_spent(owner_id, PointsLedger::clamp_spent(raw_spent))
            .await
    }

    async fn load(&self, owner_id: &AccountId) -> Result<PointsLedger, DomainError> {
        let history = self.history_repo.load_history(owner_id).await?;
        let total = ScoreSummary::summarize(&history).total();

        let spent = match self.ledger_repo.read_spent(owner_id).await? {
            Some(raw) => PointsLedger::clamp_spent(raw),
            None => self.migrate_legacy_spent(owner_id).await?,
        };

        Ok(PointsLedger::new(total, spent))
    }

    /// One-time move of the pre-ledger locally cached value into the
    /// remote counter. If another device wrote the counter while we were
    /// migrating, the re-read below picks that value up and it wins.
    async fn migrate_legacy_spent(&self, owner_id: &AccountId) -> Result<u64, DomainError> {
        let Some(legacy) = self.local_state.legacy_spent_points().await? else {
            return Ok(0);
        };

        let clamped = PointsLedger::clamp_spent(legacy);
        info!(
            "Migrating legacy spent value {} for {} into the remote ledger",
            clamped, owner_id
        );

        self.ledger_repo.write_spent(owner_id, clamped).await?;
        self.local_state.clear_legacy_spent_points().await?;

        let migrated = self
            .ledger_repo
            .read_spent(owner_id)
            .await?
            .map(PointsLedger::clamp_spent)
            .unwrap_or(clamped);

        Ok(migrated)
    }
}
