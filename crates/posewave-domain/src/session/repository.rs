use async_trait::async_trait;

use super::{DailyBuckets, GameSession};
use crate::shared::{AccountId, DomainError, SessionKey};

/// Callback invoked with a freshly decoded history whenever the remote
/// store reports a change under the owner's history path.
pub type HistoryListener = Box<dyn Fn(DailyBuckets) + Send + Sync>;

/// Cancels a live history subscription when dropped or explicitly
/// unsubscribed.
pub struct SubscriptionHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    pub fn new(cancel: Box<dyn FnOnce() + Send>) -> Self {
        Self {
            cancel: Some(cancel),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[async_trait]
pub trait SessionHistoryRepository: Send + Sync {
    /// Append a finished session under its owner's history at the bucket
    /// for the session's local date.
    ///
    /// Append-only with a uniquely generated key; an existing session is
    /// never overwritten. Returns the key the remote store assigned.
    async fn append(&self, session: &GameSession) -> Result<SessionKey, DomainError>;

    /// Load the owner's full history, grouped by local date.
    async fn load_history(&self, owner_id: &AccountId) -> Result<DailyBuckets, DomainError>;

    /// Watch the owner's history for changes; the listener receives each
    /// updated snapshot until the handle is dropped.
    async fn subscribe(
        &self,
        owner_id: &AccountId,
        listener: HistoryListener,
    ) -> Result<SubscriptionHandle, DomainError>;
}
