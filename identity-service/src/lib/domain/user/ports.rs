use async_trait::async_trait;

use crate::domain::user::errors::UserError;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;

/// Persistence operations for the user aggregate (the credential store).
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - username is already taken
    /// * `EmailAlreadyExists` - email is already registered
    /// * `DatabaseError` - storage operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Look up a user by identifier; `None` if absent.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Look up a user by unique username; `None` if absent.
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Look up a user by unique email; `None` if absent.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    /// Whether a user with this username exists.
    async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError>;

    /// Whether a user with this email exists.
    async fn exists_by_email(&self, email: &str) -> Result<bool, UserError>;
}
