use async_trait::async_trait;

use posewave_domain::profile::{ProfileRepository, UserProfile};
use posewave_domain::shared::{AccountId, DomainError};

use crate::http::DataServiceClient;

const COLLECTION: &str = "users";

/// User profiles stored as documents in the `users` collection, keyed by
/// account id.
pub struct RemoteProfileRepository {
    client: DataServiceClient,
}

impl RemoteProfileRepository {
    pub fn new(client: DataServiceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProfileRepository for RemoteProfileRepository {
    async fn find_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<UserProfile>, DomainError> {
        let document = self
            .client
            .read_document(COLLECTION, "accountId", account_id.as_str())
            .await?;

        Ok(document.map(|doc| {
            UserProfile::restore(
                account_id.clone(),
                doc.get("username")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                doc.get("email")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
            )
        }))
    }

    async fn save(&self, profile: &UserProfile) -> Result<(), DomainError> {
        self.client
            .write_document(
                COLLECTION,
                profile.account_id().as_str(),
                &serde_json::json!({
                    "accountId": profile.account_id().as_str(),
                    "username": profile.username(),
                    "email": profile.email(),
                }),
            )
            .await
    }
}
