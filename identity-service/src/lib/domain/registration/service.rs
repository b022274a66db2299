use std::sync::Arc;

use auth::PasswordHasher;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::registration::errors::RegistrationError;
use crate::domain::registration::errors::TokenRepoError;
use crate::domain::registration::models::RegistrationToken;
use crate::domain::registration::ports::RegistrationTokenRepository;
use crate::domain::role::ports::RoleAssignmentRepository;
use crate::domain::role::ports::RoleRepository;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;

/// Role granted to every newly registered employee, created on first use.
const DEFAULT_ROLE_NAME: &str = "ROLE_EMPLOYEE";
const DEFAULT_ROLE_DESCRIPTION: &str = "Default role for registered users";

/// Attempts before giving up on a colliding random token value.
const MINT_ATTEMPTS: u32 = 3;

/// Issues, validates, and purges registration invitations, and
/// orchestrates employee signup against the credential store.
pub struct RegistrationService<TR, UR, RR, AR>
where
    TR: RegistrationTokenRepository,
    UR: UserRepository,
    RR: RoleRepository,
    AR: RoleAssignmentRepository,
{
    tokens: Arc<TR>,
    users: Arc<UR>,
    roles: Arc<RR>,
    assignments: Arc<AR>,
    password_hasher: PasswordHasher,
    token_ttl: Duration,
}

/// Validated input for the signup flow.
#[derive(Debug)]
pub struct RegisterCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub password: String,
    pub token: String,
}

impl<TR, UR, RR, AR> RegistrationService<TR, UR, RR, AR>
where
    TR: RegistrationTokenRepository,
    UR: UserRepository,
    RR: RoleRepository,
    AR: RoleAssignmentRepository,
{
    pub fn new(
        tokens: Arc<TR>,
        users: Arc<UR>,
        roles: Arc<RR>,
        assignments: Arc<AR>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            tokens,
            users,
            roles,
            assignments,
            password_hasher: PasswordHasher::new(),
            token_ttl,
        }
    }

    /// Issue a registration invitation for `email` on behalf of an issuer.
    ///
    /// At most one non-expired invitation may exist per email; a second
    /// request while one is active is rejected, whoever the issuer is.
    /// An expired predecessor is replaced in the same storage
    /// transaction that inserts the new row.
    ///
    /// # Errors
    /// * `IssuerNotFound` - no user with the issuer's username
    /// * `TokenAlreadyExists` - an active invitation holds this email
    /// * `Database` - storage operation failed
    pub async fn generate(
        &self,
        email: &EmailAddress,
        issuer_username: &Username,
    ) -> Result<RegistrationToken, RegistrationError> {
        let issuer = self
            .users
            .find_by_username(issuer_username)
            .await
            .map_err(|e| RegistrationError::Database(e.to_string()))?
            .ok_or_else(|| RegistrationError::IssuerNotFound(issuer_username.to_string()))?;

        let now = Utc::now();

        if let Some(existing) = self
            .tokens
            .find_by_email(email.as_str())
            .await
            .map_err(|e| RegistrationError::Database(e.to_string()))?
        {
            if !existing.is_expired(now) {
                return Err(RegistrationError::TokenAlreadyExists);
            }
        }

        // A colliding random value is vanishingly unlikely but must not
        // surface as a domain error; retry with a fresh value.
        for _ in 0..MINT_ATTEMPTS {
            let minted = RegistrationToken::mint(email.clone(), issuer.id, now, self.token_ttl);
            match self.tokens.insert(minted, now).await {
                Ok(stored) => {
                    tracing::info!(
                        email = %stored.email,
                        issuer = %issuer.username,
                        expires_at = %stored.expires_at,
                        "Registration token issued"
                    );
                    return Ok(stored);
                }
                Err(TokenRepoError::EmailConflict) => {
                    // A racing generate won the email guard.
                    return Err(RegistrationError::TokenAlreadyExists);
                }
                Err(TokenRepoError::ValueCollision) => continue,
                Err(TokenRepoError::Database(e)) => return Err(RegistrationError::Database(e)),
            }
        }

        Err(RegistrationError::Database(
            "token value collision persisted across retries".to_string(),
        ))
    }

    /// Resolve a token value to its stored invitation.
    ///
    /// Read-only: validation never mutates or deletes the row, so a
    /// still-active invitation can be validated repeatedly.
    ///
    /// # Errors
    /// * `TokenNotFound` - no stored token with this value
    /// * `TokenExpired` - the invitation's expiry has passed
    pub async fn validate(&self, token_value: &str) -> Result<RegistrationToken, RegistrationError> {
        let token = self
            .tokens
            .find_by_token(token_value)
            .await
            .map_err(|e| RegistrationError::Database(e.to_string()))?
            .ok_or(RegistrationError::TokenNotFound)?;

        if token.is_expired(Utc::now()) {
            return Err(RegistrationError::TokenExpired(token.expires_at));
        }

        Ok(token)
    }

    /// Remove every invitation expired at `now`; returns the count.
    ///
    /// Idempotent: a second call with the same or a later `now` against
    /// an already-purged set removes nothing.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RegistrationError> {
        self.tokens
            .delete_expired(now)
            .await
            .map_err(|e| RegistrationError::Database(e.to_string()))
    }

    /// Register a new employee against a valid invitation.
    ///
    /// # Errors
    /// * `TokenNotFound` / `TokenExpired` - invitation unusable
    /// * `EmailMismatch` - the invitation is bound to another email
    /// * `UserAlreadyExists` - username or email already registered
    pub async fn register(&self, command: RegisterCommand) -> Result<User, RegistrationError> {
        let token = self.validate(&command.token).await?;

        if token.email != command.email {
            return Err(RegistrationError::EmailMismatch);
        }

        if self
            .users
            .exists_by_username(&command.username)
            .await
            .map_err(|e| RegistrationError::Database(e.to_string()))?
        {
            tracing::warn!(username = %command.username, "Registration attempt with existing username");
            return Err(RegistrationError::UserAlreadyExists(
                command.username.to_string(),
            ));
        }

        if self
            .users
            .exists_by_email(command.email.as_str())
            .await
            .map_err(|e| RegistrationError::Database(e.to_string()))?
        {
            tracing::warn!(email = %command.email, "Registration attempt with existing email");
            return Err(RegistrationError::UserAlreadyExists(
                command.email.to_string(),
            ));
        }

        let password_hash = self.password_hasher.hash(&command.password)?;
        let user = User::new(command.username, command.email, password_hash);

        let user = self.users.create(user).await.map_err(|e| match e {
            // The exists checks race against concurrent registrations;
            // the storage constraints have the final word.
            UserError::UsernameAlreadyExists(v) | UserError::EmailAlreadyExists(v) => {
                RegistrationError::UserAlreadyExists(v)
            }
            other => RegistrationError::Database(other.to_string()),
        })?;

        self.assign_default_role(&user).await?;

        tracing::info!(username = %user.username, user_id = %user.id, "Employee registered");
        Ok(user)
    }

    /// Grant the default role, creating it on first use.
    ///
    /// Both steps are idempotent upserts, so concurrent first
    /// registrations converge on a single role row.
    async fn assign_default_role(&self, user: &User) -> Result<(), RegistrationError> {
        let role = self
            .roles
            .find_or_create(DEFAULT_ROLE_NAME, DEFAULT_ROLE_DESCRIPTION)
            .await?;

        self.assignments.assign(&user.id, &role.id).await?;

        tracing::info!(role = DEFAULT_ROLE_NAME, username = %user.username, "Default role assigned");
        Ok(())
    }
}
