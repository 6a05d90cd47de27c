use std::sync::Arc;

use log::info;

use posewave_domain::account::Account;
use posewave_domain::profile::{ProfileRepository, UserProfile};
use posewave_domain::shared::DomainError;

/// Display-profile document kept next to the account.
pub struct ProfileService {
    profile_repo: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(profile_repo: Arc<dyn ProfileRepository>) -> Self {
        Self { profile_repo }
    }

    /// Fetch the profile, creating it on first sign-in with the email's
    /// local part as the initial username.
    pub async fn get_or_create(&self, account: &Account) -> Result<UserProfile, DomainError> {
        if let Some(profile) = self.profile_repo.find_by_account(account.id()).await? {
            return Ok(profile);
        }

        let username = account
            .email()
            .split('@')
            .next()
            .unwrap_or("player")
            .to_string();

        let profile = UserProfile::new(
            account.id().clone(),
            username,
            account.email().to_string(),
        )?;
        self.profile_repo.save(&profile).await?;

        info!("Created profile for {}", account.id());
        Ok(profile)
    }

    pub async fn rename(
        &self,
        account: &Account,
        username: String,
    ) -> Result<UserProfile, DomainError> {
        let mut profile = self
            .profile_repo
            .find_by_account(account.id())
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(format!("No profile for account {}", account.id()))
            })?;

        profile.rename(username)?;
        self.profile_repo.save(&profile).await?;
        Ok(profile)
    }
}
