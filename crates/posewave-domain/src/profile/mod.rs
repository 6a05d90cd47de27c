mod repository;

use serde::{Deserialize, Serialize};

use crate::shared::{AccountId, DomainError};

pub use repository::ProfileRepository;

/// Display profile kept as a document alongside the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    account_id: AccountId,
    username: String,
    email: String,
}

impl UserProfile {
    pub fn new(
        account_id: AccountId,
        username: String,
        email: String,
    ) -> Result<Self, DomainError> {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(DomainError::Validation(
                "Username cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            account_id,
            username,
            email,
        })
    }

    pub fn restore(account_id: AccountId, username: String, email: String) -> Self {
        Self {
            account_id,
            username,
            email,
        }
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn rename(&mut self, username: String) -> Result<(), DomainError> {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(DomainError::Validation(
                "Username cannot be empty".to_string(),
            ));
        }
        self.username = username;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_trims_username() {
        let profile = UserProfile::new(
            AccountId::from_string("user-1"),
            "  Flexer ".to_string(),
            "player@example.com".to_string(),
        )
        .unwrap();
        assert_eq!(profile.username(), "Flexer");
    }

    #[test]
    fn test_empty_username_rejected() {
        let result = UserProfile::new(
            AccountId::from_string("user-1"),
            "   ".to_string(),
            "player@example.com".to_string(),
        );
        assert!(result.is_err());
    }
}
