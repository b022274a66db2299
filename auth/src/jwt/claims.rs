use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

/// Claim set carried by a signed login credential.
///
/// Field names are part of the wire contract with downstream services
/// and must not change: `sub`, `username`, `email`, `roles`, `isActive`,
/// `iat`, `exp`. Timestamps are second-resolution Unix epoch values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject: the user id, rendered as a string
    pub sub: String,

    pub username: String,

    pub email: String,

    /// Uppercase role names; an ordered set so serialization is stable
    pub roles: BTreeSet<String>,

    #[serde(rename = "isActive")]
    pub is_active: bool,

    /// Issued at (Unix timestamp); stamped by the signer when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration time (Unix timestamp); stamped by the signer when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claims {
    /// Build the claim set for a freshly authenticated user.
    ///
    /// `iat` and `exp` are left unset; [`crate::TokenSigner::issue`]
    /// fills them at signing time.
    pub fn for_login<I, S>(
        subject: impl ToString,
        username: impl ToString,
        email: impl ToString,
        roles: I,
        is_active: bool,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            sub: subject.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            roles: roles.into_iter().map(|r| r.to_string()).collect(),
            is_active,
            iat: None,
            exp: None,
        }
    }

    /// Set issued-at (Unix timestamp).
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Whether the claim set has expired at `current_timestamp`.
    ///
    /// A claim set without `exp` never expires. The boundary counts as
    /// expired: `exp == now` is no longer valid.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp.map_or(false, |exp| exp <= current_timestamp)
    }
}
