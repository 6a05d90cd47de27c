use async_trait::async_trait;

use super::{Account, Credentials};
use crate::shared::DomainError;

/// Port onto the hosted account service.
///
/// The service owns credential storage, token issue and verification mail;
/// this side only tracks which account is currently signed in.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Sign in with existing credentials.
    async fn sign_in(&self, credentials: &Credentials) -> Result<Account, DomainError>;

    /// Register a new account.
    ///
    /// Returns `DomainError::EmailAlreadyRegistered` when the email is
    /// already taken, so callers can surface a distinct message.
    async fn sign_up(&self, credentials: &Credentials) -> Result<Account, DomainError>;

    /// End the current session.
    async fn sign_out(&self) -> Result<(), DomainError>;

    /// Ask the service to mail a password-reset link.
    async fn send_password_reset(&self, email: &str) -> Result<(), DomainError>;

    /// Ask the service to mail a verification link for the account.
    async fn send_email_verification(&self, account: &Account) -> Result<(), DomainError>;

    /// Re-fetch the account, picking up a fresh `email_verified` flag.
    async fn reload_account(&self, account: &Account) -> Result<Account, DomainError>;

    /// The account currently signed in on this device, if any.
    fn current_account(&self) -> Option<Account>;
}
