use async_trait::async_trait;
use log::debug;

use posewave_domain::session::{
    DailyBuckets, GameSession, HistoryListener, SessionHistoryRepository, SubscriptionHandle,
};
use posewave_domain::shared::{AccountId, DomainError, SessionKey};

use crate::http::DataServiceClient;

/// Session history stored in the service's value tree under
/// `histories/<uid>/<YYYY-MM-DD>/<key>`.
pub struct RemoteSessionHistoryRepository {
    client: DataServiceClient,
}

impl RemoteSessionHistoryRepository {
    pub fn new(client: DataServiceClient) -> Self {
        Self { client }
    }

    fn history_path(owner_id: &AccountId) -> String {
        format!("histories/{}", owner_id.as_str())
    }

    fn bucket_path(session: &GameSession) -> String {
        format!(
            "histories/{}/{}",
            session.owner_id().as_str(),
            session.local_date().format("%Y-%m-%d")
        )
    }
}

#[async_trait]
impl SessionHistoryRepository for RemoteSessionHistoryRepository {
    async fn append(&self, session: &GameSession) -> Result<SessionKey, DomainError> {
        let key = self
            .client
            .append_under_path(&Self::bucket_path(session), &session.to_remote_value())
            .await?;

        debug!(
            "[history] appended session for {} on {} as {}",
            session.owner_id(),
            session.local_date(),
            key
        );

        Ok(SessionKey::from_string(&key))
    }

    async fn load_history(&self, owner_id: &AccountId) -> Result<DailyBuckets, DomainError> {
        let value = self
            .client
            .read_value_at_path(&Self::history_path(owner_id))
            .await?;

        Ok(match value {
            Some(value) => DailyBuckets::from_remote_value(owner_id, &value),
            None => DailyBuckets::new(),
        })
    }

    async fn subscribe(
        &self,
        owner_id: &AccountId,
        listener: HistoryListener,
    ) -> Result<SubscriptionHandle, DomainError> {
        let owner = owner_id.clone();
        Ok(self.client.subscribe(
            &Self::history_path(owner_id),
            Box::new(move |value| {
                listener(DailyBuckets::from_remote_value(&owner, &value));
            }),
        ))
    }
}
