use std::sync::Arc;

use auth::Claims;
use auth::PasswordHasher;
use auth::TokenSigner;
use chrono::Duration;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::Principal;
use crate::domain::role::ports::RoleAssignmentRepository;
use crate::domain::role::service::RoleResolver;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;

/// Orchestrates credential verification, role resolution, and login
/// token issuance.
///
/// Logins never mutate the credential store; the only output is the
/// signed token handed back to the caller.
pub struct AuthService<UR, AR>
where
    UR: UserRepository,
    AR: RoleAssignmentRepository,
{
    users: Arc<UR>,
    roles: RoleResolver<AR>,
    password_hasher: PasswordHasher,
    signer: Arc<TokenSigner>,
    token_ttl: Duration,
}

impl<UR, AR> AuthService<UR, AR>
where
    UR: UserRepository,
    AR: RoleAssignmentRepository,
{
    pub fn new(
        users: Arc<UR>,
        assignments: Arc<AR>,
        signer: Arc<TokenSigner>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            users,
            roles: RoleResolver::new(assignments),
            password_hasher: PasswordHasher::new(),
            signer,
            token_ttl,
        }
    }

    /// Verify credentials and resolve the caller's identity.
    ///
    /// # Errors
    /// * `InvalidCredentials` - unknown username or wrong password
    ///   (deliberately indistinguishable)
    /// * `AccountDisabled` - the account's active flag is false;
    ///   reported regardless of password correctness
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Principal, AuthError> {
        // A username that fails validation cannot belong to any account.
        let username = Username::new(username.to_string())
            .map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .users
            .find_by_username(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.active {
            tracing::warn!(username = %username, "Login attempt against disabled account");
            return Err(AuthError::AccountDisabled);
        }

        let password_matches = self.password_hasher.verify(password, &user.password_hash)?;
        if !password_matches {
            return Err(AuthError::InvalidCredentials);
        }

        let roles = self.roles.effective_roles(&user.id).await?;

        Ok(Principal { user, roles })
    }

    /// Issue a signed login token for an authenticated principal.
    ///
    /// Returns the compact token and its expiry (epoch seconds).
    pub fn issue_login_token(&self, principal: &Principal) -> Result<(String, i64), AuthError> {
        let user = &principal.user;
        let claims = Claims::for_login(
            user.id.to_string(),
            user.username.as_str(),
            user.email.as_str(),
            principal.roles.iter().cloned(),
            user.active,
        );

        let (token, expires_at) = self.signer.issue(claims, self.token_ttl)?;
        Ok((token, expires_at))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use mockall::mock;

    use super::*;
    use crate::domain::role::errors::RoleError;
    use crate::domain::role::models::RoleAssignment;
    use crate::domain::role::models::RoleId;
    use crate::domain::user::errors::UserError;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::User;
    use crate::domain::user::models::UserId;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
            async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError>;
            async fn exists_by_email(&self, email: &str) -> Result<bool, UserError>;
        }
    }

    mock! {
        pub TestAssignmentRepository {}

        #[async_trait]
        impl RoleAssignmentRepository for TestAssignmentRepository {
            async fn active_role_names(&self, user_id: &UserId) -> Result<Vec<String>, RoleError>;
            async fn assign(&self, user_id: &UserId, role_id: &RoleId) -> Result<RoleAssignment, RoleError>;
        }
    }

    fn test_signer() -> Arc<TokenSigner> {
        Arc::new(TokenSigner::new(b"test_secret_key_at_least_32_bytes!"))
    }

    fn stored_user(password: &str, active: bool) -> User {
        let hasher = PasswordHasher::new();
        User {
            id: UserId::new(),
            username: Username::new("alice".to_string()).unwrap(),
            email: EmailAddress::new("alice@example.com".to_string()).unwrap(),
            password_hash: hasher.hash(password).unwrap(),
            active,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn service(
        users: MockTestUserRepository,
        assignments: MockTestAssignmentRepository,
    ) -> AuthService<MockTestUserRepository, MockTestAssignmentRepository> {
        AuthService::new(
            Arc::new(users),
            Arc::new(assignments),
            test_signer(),
            Duration::hours(4),
        )
    }

    #[tokio::test]
    async fn test_authenticate_success_resolves_active_roles() {
        let user = stored_user("correct horse", true);
        let returned = user.clone();

        let mut users = MockTestUserRepository::new();
        users
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));

        let mut assignments = MockTestAssignmentRepository::new();
        assignments
            .expect_active_role_names()
            .times(1)
            .returning(|_| Ok(vec!["role_employee".to_string(), "ROLE_HR".to_string()]));

        let service = service(users, assignments);
        let principal = service.authenticate("alice", "correct horse").await.unwrap();

        assert_eq!(principal.user.id, user.id);
        assert!(principal.roles.contains("ROLE_EMPLOYEE"));
        assert!(principal.roles.contains("ROLE_HR"));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let user = stored_user("correct horse", true);

        let mut users = MockTestUserRepository::new();
        users
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(users, MockTestAssignmentRepository::new());
        let result = service.authenticate("alice", "battery staple").await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user_collapses_to_invalid_credentials() {
        let mut users = MockTestUserRepository::new();
        users
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(users, MockTestAssignmentRepository::new());
        let result = service.authenticate("nobody", "whatever").await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_disabled_account_wins_over_password() {
        let user = stored_user("correct horse", false);

        let mut users = MockTestUserRepository::new();
        users
            .expect_find_by_username()
            .times(2)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(users, MockTestAssignmentRepository::new());

        // Disabled is reported for both the right and the wrong password
        let with_right = service.authenticate("alice", "correct horse").await;
        assert!(matches!(with_right, Err(AuthError::AccountDisabled)));

        let with_wrong = service.authenticate("alice", "nope").await;
        assert!(matches!(with_wrong, Err(AuthError::AccountDisabled)));
    }

    #[tokio::test]
    async fn test_issue_login_token_claim_schema() {
        let user = stored_user("correct horse", true);
        let returned = user.clone();

        let mut users = MockTestUserRepository::new();
        users
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));

        let mut assignments = MockTestAssignmentRepository::new();
        assignments
            .expect_active_role_names()
            .times(1)
            .returning(|_| Ok(vec!["ROLE_EMPLOYEE".to_string()]));

        let signer = test_signer();
        let service = AuthService::new(
            Arc::new(users),
            Arc::new(assignments),
            Arc::clone(&signer),
            Duration::hours(4),
        );

        let principal = service.authenticate("alice", "correct horse").await.unwrap();
        let (token, expires_at) = service.issue_login_token(&principal).unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.roles.len(), 1);
        assert!(claims.roles.contains("ROLE_EMPLOYEE"));
        assert!(claims.is_active);
        assert_eq!(claims.exp, Some(expires_at));
        assert_eq!(
            expires_at - claims.iat.unwrap(),
            Duration::hours(4).num_seconds()
        );
    }
}
