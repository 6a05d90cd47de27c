use serde::{Deserialize, Serialize};

use crate::shared::DomainError;

/// Sign-in / registration input.
///
/// Validated locally before any remote call; the remote service performs
/// its own authoritative checks on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    pub const MIN_PASSWORD_LEN: usize = 6;

    pub fn new(email: String, password: String) -> Result<Self, DomainError> {
        let email = email.trim().to_string();

        if email.is_empty() {
            return Err(DomainError::Validation(
                "Email cannot be empty".to_string(),
            ));
        }

        // Light sanity check only; the service is the authority on format
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(DomainError::Validation(format!(
                "Email address is not valid: {}",
                email
            )));
        }

        if password.len() < Self::MIN_PASSWORD_LEN {
            return Err(DomainError::Validation(format!(
                "Password must be at least {} characters",
                Self::MIN_PASSWORD_LEN
            )));
        }

        Ok(Self { email, password })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}
