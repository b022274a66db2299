use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::role::errors::RoleError;
use crate::domain::role::ports::RoleAssignmentRepository;
use crate::domain::user::models::UserId;

/// Derives the effective role set of a user from assignment records.
///
/// Read-only and deterministic: the result depends solely on the
/// stored assignments at the moment of the call.
pub struct RoleResolver<AR>
where
    AR: RoleAssignmentRepository,
{
    assignments: Arc<AR>,
}

impl<AR> RoleResolver<AR>
where
    AR: RoleAssignmentRepository,
{
    pub fn new(assignments: Arc<AR>) -> Self {
        Self { assignments }
    }

    /// Uppercase names of every active role assigned to the user.
    ///
    /// An empty set is a valid result (unprivileged user).
    pub async fn effective_roles(&self, user_id: &UserId) -> Result<BTreeSet<String>, RoleError> {
        let names = self.assignments.active_role_names(user_id).await?;
        Ok(names.into_iter().map(|n| n.to_uppercase()).collect())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use mockall::mock;

    use super::*;
    use crate::domain::role::models::RoleAssignment;
    use crate::domain::role::models::RoleId;

    mock! {
        pub TestAssignmentRepository {}

        #[async_trait]
        impl RoleAssignmentRepository for TestAssignmentRepository {
            async fn active_role_names(&self, user_id: &UserId) -> Result<Vec<String>, RoleError>;
            async fn assign(&self, user_id: &UserId, role_id: &RoleId) -> Result<RoleAssignment, RoleError>;
        }
    }

    #[tokio::test]
    async fn test_effective_roles_are_uppercased_and_deduplicated() {
        let mut assignments = MockTestAssignmentRepository::new();
        assignments.expect_active_role_names().times(1).returning(|_| {
            Ok(vec![
                "role_hr".to_string(),
                "ROLE_EMPLOYEE".to_string(),
                "Role_HR".to_string(),
            ])
        });

        let resolver = RoleResolver::new(Arc::new(assignments));
        let roles = resolver.effective_roles(&UserId::new()).await.unwrap();

        assert_eq!(roles.len(), 2);
        assert!(roles.contains("ROLE_HR"));
        assert!(roles.contains("ROLE_EMPLOYEE"));
    }

    #[tokio::test]
    async fn test_effective_roles_empty_set_is_valid() {
        let mut assignments = MockTestAssignmentRepository::new();
        assignments
            .expect_active_role_names()
            .times(1)
            .returning(|_| Ok(vec![]));

        let resolver = RoleResolver::new(Arc::new(assignments));
        let roles = resolver.effective_roles(&UserId::new()).await.unwrap();

        assert!(roles.is_empty());
    }
}
