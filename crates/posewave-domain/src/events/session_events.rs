use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;

use crate::events::DomainEvent;
use crate::shared::{AccountId, SessionKey};

/// Macro to implement DomainEvent trait with type name
macro_rules! impl_domain_event {
    ($type:ty) => {
        impl DomainEvent for $type {
            fn as_any(&self) -> &(dyn Any + Send + Sync) {
                self
            }

            fn event_type_name(&self) -> &'static str {
                std::any::type_name::<Self>()
            }
        }
    };
}

/// Fired when a finished round was durably appended to the owner's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecorded {
    pub owner_id: AccountId,
    pub session_key: SessionKey,
    pub score: u32,
    pub waves_cleared: u32,
    pub local_date: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

impl_domain_event!(SessionRecorded);

/// Fired after a redemption updated the remote spent counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsRedeemed {
    pub owner_id: AccountId,
    pub points: u64,
    pub spent_after: u64,
    pub occurred_at: DateTime<Utc>,
}

impl_domain_event!(PointsRedeemed);

/// Fired when the authoritative streak recomputation replaced the cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakRefreshed {
    pub owner_id: AccountId,
    pub days: u32,
    pub occurred_at: DateTime<Utc>,
}

impl_domain_event!(StreakRefreshed);
