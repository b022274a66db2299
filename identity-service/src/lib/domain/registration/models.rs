use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UserId;

/// Registration token unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationTokenId(pub Uuid);

impl RegistrationTokenId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RegistrationTokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RegistrationTokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single-recipient registration invitation.
///
/// The token value is globally unique and never reused. Lifecycle:
/// active while `expires_at > now`, expired once time passes it, and
/// gone once the purge removes the row. Successful registration does
/// not consume the token; it stays usable until expiry.
#[derive(Debug, Clone)]
pub struct RegistrationToken {
    pub id: RegistrationTokenId,
    /// Opaque unique token value handed to the invited employee
    pub token: String,
    /// The only email this invitation is valid for
    pub email: EmailAddress,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Issuing user; weak reference, no cascade
    pub created_by: UserId,
}

impl RegistrationToken {
    /// Mint a fresh invitation with a cryptographically random value.
    pub fn mint(
        email: EmailAddress,
        created_by: UserId,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: RegistrationTokenId::new(),
            token: Uuid::new_v4().to_string(),
            email,
            expires_at: now + ttl,
            created_at: now,
            created_by,
        }
    }

    /// Whether the invitation has expired at `now` (boundary counts).
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
