use async_trait::async_trait;
use log::info;

use posewave_domain::events::{DomainEvent, EventBus};
use posewave_domain::shared::DomainError;

/// Event bus that records published events in the log.
///
/// The headless core has no UI to notify; screens subscribe at the
/// presentation layer of the host app instead.
#[derive(Debug, Default)]
pub struct LoggingEventBus;

impl LoggingEventBus {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventBus for LoggingEventBus {
    async fn publish(&self, event: Box<dyn DomainEvent>) -> Result<(), DomainError> {
        info!("[event] {}: {:?}", event.event_type_name(), event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use posewave_domain::events::SessionRecorded;
    use posewave_domain::shared::{AccountId, SessionKey};

    #[tokio::test]
    async fn test_publish_succeeds() {
        let bus = LoggingEventBus::new();
        let event = SessionRecorded {
            owner_id: AccountId::from_string("user-1"),
            session_key: SessionKey::from_string("k1"),
            score: 10,
            waves_cleared: 1,
            local_date: Utc::now().date_naive(),
            occurred_at: Utc::now(),
        };
        assert!(bus.publish(Box::new(event)).await.is_ok());
    }
}
