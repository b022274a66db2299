use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::registration::errors::TokenRepoError;
use crate::domain::registration::models::RegistrationToken;

/// Persistence operations for registration tokens.
///
/// Records are keyed by the unique token value with secondary lookups
/// by email and by expiration (validation and the purge scan).
#[async_trait]
pub trait RegistrationTokenRepository: Send + Sync + 'static {
    /// Look up a token by its unique value; `None` if absent.
    async fn find_by_token(&self, token: &str) -> Result<Option<RegistrationToken>, TokenRepoError>;

    /// Look up the token on file for an email; `None` if absent.
    async fn find_by_email(&self, email: &str) -> Result<Option<RegistrationToken>, TokenRepoError>;

    /// Atomically store a freshly minted token.
    ///
    /// Runs as one transaction: an expired predecessor row for the same
    /// email is removed and the new row inserted under the storage
    /// uniqueness guards, so two racing inserts for one email cannot
    /// both succeed.
    ///
    /// # Errors
    /// * `EmailConflict` - a still-active token holds the email guard
    /// * `ValueCollision` - the token value already exists (retry with
    ///   a fresh value)
    /// * `Database` - storage operation failed
    async fn insert(
        &self,
        token: RegistrationToken,
        now: DateTime<Utc>,
    ) -> Result<RegistrationToken, TokenRepoError>;

    /// Delete every token with `expires_at <= now`; returns the count.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenRepoError>;
}
