use auth::PasswordError;
use chrono::DateTime;
use chrono::Utc;
use thiserror::Error;

use crate::domain::role::errors::RoleError;

/// Storage-level error for the registration token repository.
///
/// The two conflict variants are distinct on purpose: an email
/// conflict is a domain outcome (someone else holds an active
/// invitation), a value collision is a freak random-collision event
/// the service retries with a fresh value.
#[derive(Debug, Clone, Error)]
pub enum TokenRepoError {
    #[error("An active token already exists for this email")]
    EmailConflict,

    #[error("Token value collided with an existing row")]
    ValueCollision,

    #[error("Database error: {0}")]
    Database(String),
}

/// Error for the registration token lifecycle and signup orchestration.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Issuer not found: {0}")]
    IssuerNotFound(String),

    #[error("Token not found")]
    TokenNotFound,

    #[error("Token expired at {0}")]
    TokenExpired(DateTime<Utc>),

    #[error("A token for this email already exists and is valid")]
    TokenAlreadyExists,

    #[error("Email does not match the token")]
    EmailMismatch,

    #[error("User with username or email '{0}' already exists")]
    UserAlreadyExists(String),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<RoleError> for RegistrationError {
    fn from(err: RoleError) -> Self {
        RegistrationError::Database(err.to_string())
    }
}
