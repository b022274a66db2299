use std::collections::BTreeSet;

use crate::domain::user::models::User;

/// Resolved identity produced by successful authentication.
///
/// Ephemeral value object: built per login, handed to the caller,
/// never persisted.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
    /// Uppercase names of the user's active roles
    pub roles: BTreeSet<String>,
}
