use async_trait::async_trait;

use crate::domain::role::errors::RoleError;
use crate::domain::role::models::Role;
use crate::domain::role::models::RoleAssignment;
use crate::domain::role::models::RoleId;
use crate::domain::user::models::UserId;

/// Persistence operations for roles.
#[async_trait]
pub trait RoleRepository: Send + Sync + 'static {
    /// Look up a role by its unique name; `None` if absent.
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, RoleError>;

    /// Fetch the role with this name, creating it if missing.
    ///
    /// Idempotent upsert keyed on the role name: under concurrent
    /// first use, every caller receives the same stored row.
    async fn find_or_create(&self, name: &str, description: &str) -> Result<Role, RoleError>;
}

/// Persistence operations for the user-role join.
#[async_trait]
pub trait RoleAssignmentRepository: Send + Sync + 'static {
    /// Names of roles actively assigned to the user.
    ///
    /// Only assignments with `active == true` whose role row still
    /// exists are returned; names come back as stored, not normalized.
    async fn active_role_names(&self, user_id: &UserId) -> Result<Vec<String>, RoleError>;

    /// Assign a role to a user.
    ///
    /// Upsert on the (user, role) pair: re-assigning an existing pair
    /// reactivates it instead of inserting a duplicate.
    async fn assign(&self, user_id: &UserId, role_id: &RoleId)
        -> Result<RoleAssignment, RoleError>;
}
