use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn from_string(s: &str) -> Self {
                Self(s.to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

define_id!(AccountId);
define_id!(SessionKey);
define_id!(RoundId);

/// Error codes for structured error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Authentication & Authorization (1xxx)
    Unauthenticated = 1001,
    InvalidCredentials = 1002,
    EmailAlreadyRegistered = 1003,

    // Resource Not Found (2xxx)
    AccountNotFound = 2001,
    DocumentNotFound = 2002,

    // Business Logic (3xxx)
    RecordFailed = 3001,
    RedemptionFailed = 3002,

    // Data & Persistence (4xxx)
    RepositoryError = 4001,
    SerializationError = 4002,

    // Infrastructure (5xxx)
    InfrastructureError = 5001,
    RemoteReadFailed = 5002,
    RemoteWriteFailed = 5003,
    ClassificationFailed = 5004,

    // Validation (6xxx)
    ValidationError = 6001,
}

impl ErrorCode {
    pub fn code(&self) -> u16 {
        *self as u16
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorCode::Unauthenticated
            | ErrorCode::InvalidCredentials
            | ErrorCode::RemoteReadFailed
            | ErrorCode::RemoteWriteFailed
            | ErrorCode::RecordFailed => ErrorSeverity::Warning,

            ErrorCode::AccountNotFound
            | ErrorCode::DocumentNotFound
            | ErrorCode::EmailAlreadyRegistered
            | ErrorCode::ValidationError => ErrorSeverity::Info,

            ErrorCode::RepositoryError
            | ErrorCode::SerializationError
            | ErrorCode::InfrastructureError => ErrorSeverity::Error,

            _ => ErrorSeverity::Warning,
        }
    }

    /// Errors the caller may reasonably retry or ignore
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorCode::RemoteReadFailed
                | ErrorCode::RemoteWriteFailed
                | ErrorCode::ClassificationFailed
                | ErrorCode::RecordFailed
        )
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Email already registered: {0}")]
    EmailAlreadyRegistered(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Remote read failed: {0}")]
    RemoteReadFailed(String),

    #[error("Remote write failed: {0}")]
    RemoteWriteFailed(String),

    #[error("Classification failed: {0}")]
    ClassificationFailed(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl DomainError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Unauthenticated(_) => ErrorCode::Unauthenticated,
            DomainError::InvalidCredentials(_) => ErrorCode::InvalidCredentials,
            DomainError::EmailAlreadyRegistered(_) => ErrorCode::EmailAlreadyRegistered,
            DomainError::AccountNotFound(_) => ErrorCode::AccountNotFound,
            DomainError::RemoteReadFailed(_) => ErrorCode::RemoteReadFailed,
            DomainError::RemoteWriteFailed(_) => ErrorCode::RemoteWriteFailed,
            DomainError::ClassificationFailed(_) => ErrorCode::ClassificationFailed,
            DomainError::Repository(_) => ErrorCode::RepositoryError,
            DomainError::Infrastructure(_) => ErrorCode::InfrastructureError,
            DomainError::Validation(_) => ErrorCode::ValidationError,
            DomainError::Serialization(_) => ErrorCode::SerializationError,
            DomainError::NotFound(_) => ErrorCode::DocumentNotFound,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            DomainError::Unauthenticated(msg)
            | DomainError::InvalidCredentials(msg)
            | DomainError::EmailAlreadyRegistered(msg)
            | DomainError::AccountNotFound(msg)
            | DomainError::RemoteReadFailed(msg)
            | DomainError::RemoteWriteFailed(msg)
            | DomainError::ClassificationFailed(msg)
            | DomainError::Repository(msg)
            | DomainError::Infrastructure(msg)
            | DomainError::Validation(msg)
            | DomainError::Serialization(msg)
            | DomainError::NotFound(msg) => msg,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.code().severity()
    }

    pub fn is_recoverable(&self) -> bool {
        self.code().is_recoverable()
    }

    pub fn format_with_code(&self) -> String {
        format!("[{}] {}", self.code().code(), self)
    }
}
