use async_trait::async_trait;

use posewave_domain::ledger::LedgerRepository;
use posewave_domain::shared::{AccountId, DomainError};

use crate::http::DataServiceClient;

/// Spent-points counter stored at `ledgers/<uid>/spentPoints`.
pub struct RemoteLedgerRepository {
    client: DataServiceClient,
}

impl RemoteLedgerRepository {
    pub fn new(client: DataServiceClient) -> Self {
        Self { client }
    }

    fn spent_path(owner_id: &AccountId) -> String {
        format!("ledgers/{}/spentPoints", owner_id.as_str())
    }
}

#[async_trait]
impl LedgerRepository for RemoteLedgerRepository {
    async fn read_spent(&self, owner_id: &AccountId) -> Result<Option<i64>, DomainError> {
        let value = self
            .client
            .read_value_at_path(&Self::spent_path(owner_id))
            .await?;

        // A counter some other client wrote as a float still reads back
        Ok(value.and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))))
    }

    async fn write_spent(&self, owner_id: &AccountId, spent: u64) -> Result<(), DomainError> {
        self.client
            .set_value_at_path(&Self::spent_path(owner_id), &serde_json::json!(spent))
            .await
    }
}
