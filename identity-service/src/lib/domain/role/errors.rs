use thiserror::Error;

/// Error for role and role-assignment storage operations
#[derive(Debug, Clone, Error)]
pub enum RoleError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}
