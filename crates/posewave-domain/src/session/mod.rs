mod aggregate;
mod buckets;
mod repository;

pub use aggregate::GameSession;
pub use buckets::DailyBuckets;
pub use repository::{HistoryListener, SessionHistoryRepository, SubscriptionHandle};
