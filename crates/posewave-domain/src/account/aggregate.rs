use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::{AccountId, DomainError};

/// An authenticated identity issued by the account service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    email: String,
    email_verified: bool,
    signed_in_at: DateTime<Utc>,
}

impl Account {
    pub fn new(id: AccountId, email: String, email_verified: bool) -> Result<Self, DomainError> {
        if email.trim().is_empty() {
            return Err(DomainError::Validation(
                "Account email cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            id,
            email: email.trim().to_string(),
            email_verified,
            signed_in_at: Utc::now(),
        })
    }

    pub fn restore(
        id: AccountId,
        email: String,
        email_verified: bool,
        signed_in_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            email_verified,
            signed_in_at,
        }
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn email_verified(&self) -> bool {
        self.email_verified
    }

    pub fn signed_in_at(&self) -> DateTime<Utc> {
        self.signed_in_at
    }

    pub fn mark_email_verified(&mut self) {
        self.email_verified = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account() {
        let account =
            Account::new(AccountId::new(), "player@example.com".to_string(), false).unwrap();
        assert_eq!(account.email(), "player@example.com");
        assert!(!account.email_verified());
    }

    #[test]
    fn test_empty_email_rejected() {
        let result = Account::new(AccountId::new(), "  ".to_string(), false);
        assert!(result.is_err());
    }

    #[test]
    fn test_mark_email_verified() {
        let mut account =
            Account::new(AccountId::new(), "player@example.com".to_string(), false).unwrap();
        account.mark_email_verified();
        assert!(account.email_verified());
    }
}
