use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::TokenSigner;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use identity_service::domain::auth::service::AuthService;
use identity_service::domain::registration::errors::TokenRepoError;
use identity_service::domain::registration::models::RegistrationToken;
use identity_service::domain::registration::ports::RegistrationTokenRepository;
use identity_service::domain::registration::service::RegistrationService;
use identity_service::domain::role::errors::RoleError;
use identity_service::domain::role::models::Role;
use identity_service::domain::role::models::RoleAssignment;
use identity_service::domain::role::models::RoleId;
use identity_service::domain::role::ports::RoleAssignmentRepository;
use identity_service::domain::role::ports::RoleRepository;
use identity_service::domain::user::errors::UserError;
use identity_service::domain::user::models::EmailAddress;
use identity_service::domain::user::models::User;
use identity_service::domain::user::models::UserId;
use identity_service::domain::user::models::Username;
use identity_service::domain::user::ports::UserRepository;
use uuid::Uuid;

/// In-memory user store honoring the unique username/email guards.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(UserError::UsernameAlreadyExists(user.username.to_string()));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == *username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email.as_str() == email).cloned())
    }

    async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().any(|u| u.username == *username))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().any(|u| u.email.as_str() == email))
    }
}

/// In-memory role store with upsert-by-name semantics.
#[derive(Default)]
pub struct InMemoryRoleRepository {
    roles: Mutex<Vec<Role>>,
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, RoleError> {
        let roles = self.roles.lock().unwrap();
        Ok(roles.iter().find(|r| r.name == name).cloned())
    }

    async fn find_or_create(&self, name: &str, description: &str) -> Result<Role, RoleError> {
        let mut roles = self.roles.lock().unwrap();
        if let Some(existing) = roles.iter().find(|r| r.name == name) {
            return Ok(existing.clone());
        }
        let now = Utc::now();
        let role = Role {
            id: RoleId::new(),
            name: name.to_string(),
            description: description.to_string(),
            created_at: now,
            updated_at: now,
        };
        roles.push(role.clone());
        Ok(role)
    }
}

/// In-memory user-role join resolving names through the role store.
pub struct InMemoryAssignmentRepository {
    assignments: Mutex<Vec<RoleAssignment>>,
    roles: Arc<InMemoryRoleRepository>,
}

impl InMemoryAssignmentRepository {
    pub fn new(roles: Arc<InMemoryRoleRepository>) -> Self {
        Self {
            assignments: Mutex::new(Vec::new()),
            roles,
        }
    }

    /// Deactivate the (user, role) pair without removing it.
    pub fn deactivate(&self, user_id: &UserId, role_id: &RoleId) {
        let mut assignments = self.assignments.lock().unwrap();
        for assignment in assignments.iter_mut() {
            if assignment.user_id == *user_id && assignment.role_id == *role_id {
                assignment.active = false;
            }
        }
    }
}

#[async_trait]
impl RoleAssignmentRepository for InMemoryAssignmentRepository {
    async fn active_role_names(&self, user_id: &UserId) -> Result<Vec<String>, RoleError> {
        let role_ids: Vec<RoleId> = {
            let assignments = self.assignments.lock().unwrap();
            assignments
                .iter()
                .filter(|a| a.user_id == *user_id && a.active)
                .map(|a| a.role_id)
                .collect()
        };

        let roles = self.roles.roles.lock().unwrap();
        Ok(roles
            .iter()
            .filter(|r| role_ids.contains(&r.id))
            .map(|r| r.name.clone())
            .collect())
    }

    async fn assign(
        &self,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> Result<RoleAssignment, RoleError> {
        let mut assignments = self.assignments.lock().unwrap();
        if let Some(existing) = assignments
            .iter_mut()
            .find(|a| a.user_id == *user_id && a.role_id == *role_id)
        {
            existing.active = true;
            existing.updated_at = Utc::now();
            return Ok(existing.clone());
        }
        let now = Utc::now();
        let assignment = RoleAssignment {
            id: Uuid::new_v4(),
            user_id: *user_id,
            role_id: *role_id,
            active: true,
            created_at: now,
            updated_at: now,
        };
        assignments.push(assignment.clone());
        Ok(assignment)
    }
}

/// In-memory registration token store with the email/value guards.
#[derive(Default)]
pub struct InMemoryTokenRepository {
    tokens: Mutex<Vec<RegistrationToken>>,
}

impl InMemoryTokenRepository {
    /// Rewrite a stored token's expiry to simulate elapsed time.
    pub fn set_expiry(&self, token_value: &str, expires_at: DateTime<Utc>) {
        let mut tokens = self.tokens.lock().unwrap();
        for token in tokens.iter_mut() {
            if token.token == token_value {
                token.expires_at = expires_at;
            }
        }
    }

    pub fn count(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

#[async_trait]
impl RegistrationTokenRepository for InMemoryTokenRepository {
    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<RegistrationToken>, TokenRepoError> {
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens.iter().find(|t| t.token == token).cloned())
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<RegistrationToken>, TokenRepoError> {
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens.iter().find(|t| t.email.as_str() == email).cloned())
    }

    async fn insert(
        &self,
        token: RegistrationToken,
        now: DateTime<Utc>,
    ) -> Result<RegistrationToken, TokenRepoError> {
        let mut tokens = self.tokens.lock().unwrap();

        tokens.retain(|t| !(t.email == token.email && t.expires_at <= now));

        if tokens.iter().any(|t| t.email == token.email) {
            return Err(TokenRepoError::EmailConflict);
        }
        if tokens.iter().any(|t| t.token == token.token) {
            return Err(TokenRepoError::ValueCollision);
        }
        tokens.push(token.clone());
        Ok(token)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenRepoError> {
        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| t.expires_at > now);
        Ok((before - tokens.len()) as u64)
    }
}

pub type TestAuthService = AuthService<InMemoryUserRepository, InMemoryAssignmentRepository>;
pub type TestRegistrationService = RegistrationService<
    InMemoryTokenRepository,
    InMemoryUserRepository,
    InMemoryRoleRepository,
    InMemoryAssignmentRepository,
>;

/// Fully wired services over the in-memory stores, with handles to the
/// stores kept open for seeding and inspection.
pub struct TestHarness {
    pub users: Arc<InMemoryUserRepository>,
    pub roles: Arc<InMemoryRoleRepository>,
    pub assignments: Arc<InMemoryAssignmentRepository>,
    pub tokens: Arc<InMemoryTokenRepository>,
    pub signer: Arc<TokenSigner>,
    pub auth_service: TestAuthService,
    pub registration_service: TestRegistrationService,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_token_ttl(Duration::hours(24))
    }

    pub fn with_token_ttl(token_ttl: Duration) -> Self {
        let users = Arc::new(InMemoryUserRepository::default());
        let roles = Arc::new(InMemoryRoleRepository::default());
        let assignments = Arc::new(InMemoryAssignmentRepository::new(Arc::clone(&roles)));
        let tokens = Arc::new(InMemoryTokenRepository::default());
        let signer = Arc::new(TokenSigner::new(b"integration_test_signing_key_0123456789"));

        let auth_service = AuthService::new(
            Arc::clone(&users),
            Arc::clone(&assignments),
            Arc::clone(&signer),
            Duration::hours(4),
        );

        let registration_service = RegistrationService::new(
            Arc::clone(&tokens),
            Arc::clone(&users),
            Arc::clone(&roles),
            Arc::clone(&assignments),
            token_ttl,
        );

        Self {
            users,
            roles,
            assignments,
            tokens,
            signer,
            auth_service,
            registration_service,
        }
    }

    /// Seed a user directly into the store, bypassing registration.
    pub async fn seed_user(&self, username: &str, email: &str, password: &str, active: bool) -> User {
        let hasher = PasswordHasher::new();
        let mut user = User::new(
            Username::new(username.to_string()).unwrap(),
            EmailAddress::new(email.to_string()).unwrap(),
            hasher.hash(password).unwrap(),
        );
        user.active = active;
        self.users.create(user).await.unwrap()
    }

    /// Seed a role and actively assign it to the user.
    pub async fn seed_role_assignment(&self, user_id: &UserId, role_name: &str) -> Role {
        let role = self
            .roles
            .find_or_create(role_name, "seeded for test")
            .await
            .unwrap();
        self.assignments.assign(user_id, &role.id).await.unwrap();
        role
    }
}

pub fn email(raw: &str) -> EmailAddress {
    EmailAddress::new(raw.to_string()).unwrap()
}

pub fn username(raw: &str) -> Username {
    Username::new(raw.to_string()).unwrap()
}
