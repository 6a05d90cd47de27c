use async_trait::async_trait;

use super::UserProfile;
use crate::shared::{AccountId, DomainError};

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<UserProfile>, DomainError>;

    async fn save(&self, profile: &UserProfile) -> Result<(), DomainError>;
}
