use auth::JwtError;
use auth::PasswordError;
use thiserror::Error;

use crate::domain::role::errors::RoleError;
use crate::domain::user::errors::UserError;

/// Error for the login flow.
///
/// Unknown username and wrong password both surface as
/// `InvalidCredentials` so callers cannot enumerate accounts.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token signing error: {0}")]
    Signing(#[from] JwtError),

    #[error("Role resolution failed: {0}")]
    Role(#[from] RoleError),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<UserError> for AuthError {
    fn from(err: UserError) -> Self {
        AuthError::Database(err.to_string())
    }
}
