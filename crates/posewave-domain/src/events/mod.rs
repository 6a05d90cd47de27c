mod session_events;

use async_trait::async_trait;
use std::any::Any;

use crate::shared::DomainError;

pub use session_events::{PointsRedeemed, SessionRecorded, StreakRefreshed};

/// Marker trait for events published after a state change committed.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    fn as_any(&self) -> &(dyn Any + Send + Sync);

    fn event_type_name(&self) -> &'static str;
}

#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: Box<dyn DomainEvent>) -> Result<(), DomainError>;
}
