use async_trait::async_trait;

use crate::shared::{AccountId, DomainError};

#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Read the remotely stored spent-points counter.
    ///
    /// `None` means the account has no remote counter yet (fresh account or
    /// pre-migration install); callers decide how to fall back.
    async fn read_spent(&self, owner_id: &AccountId) -> Result<Option<i64>, DomainError>;

    /// Persist the spent-points counter. Callers must clamp to >= 0 first;
    /// implementations may reject negatives outright.
    async fn write_spent(&self, owner_id: &AccountId, spent: u64) -> Result<(), DomainError>;
}
