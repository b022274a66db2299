use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::role::errors::RoleError;
use crate::domain::role::models::Role;
use crate::domain::role::models::RoleAssignment;
use crate::domain::role::models::RoleId;
use crate::domain::role::ports::RoleAssignmentRepository;
use crate::domain::role::ports::RoleRepository;
use crate::domain::user::models::UserId;

pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_role(row: &PgRow) -> Result<Role, RoleError> {
        let id: Uuid = row.try_get("id").map_err(db_err)?;
        Ok(Role {
            id: RoleId(id),
            name: row.try_get("name").map_err(db_err)?,
            description: row.try_get("description").map_err(db_err)?,
            created_at: row.try_get("created_at").map_err(db_err)?,
            updated_at: row.try_get("updated_at").map_err(db_err)?,
        })
    }
}

fn db_err(e: sqlx::Error) -> RoleError {
    RoleError::DatabaseError(e.to_string())
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, RoleError> {
        let row = sqlx::query(
            "SELECT id, name, description, created_at, updated_at FROM roles WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(Self::row_to_role).transpose()
    }

    async fn find_or_create(&self, name: &str, description: &str) -> Result<Role, RoleError> {
        // The no-op update lets RETURNING yield the existing row when a
        // concurrent caller created the role first.
        let row = sqlx::query(
            r#"
            INSERT INTO roles (id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Self::row_to_role(&row)
    }
}

pub struct PostgresRoleAssignmentRepository {
    pool: PgPool,
}

impl PostgresRoleAssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleAssignmentRepository for PostgresRoleAssignmentRepository {
    async fn active_role_names(&self, user_id: &UserId) -> Result<Vec<String>, RoleError> {
        let rows = sqlx::query(
            r#"
            SELECT r.name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id = $1 AND ur.active
            "#,
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter()
            .map(|row| row.try_get("name").map_err(db_err))
            .collect()
    }

    async fn assign(
        &self,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> Result<RoleAssignment, RoleError> {
        let row = sqlx::query(
            r#"
            INSERT INTO user_roles (id, user_id, role_id, active, created_at, updated_at)
            VALUES ($1, $2, $3, TRUE, NOW(), NOW())
            ON CONFLICT (user_id, role_id)
            DO UPDATE SET active = TRUE, updated_at = NOW()
            RETURNING id, user_id, role_id, active, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id.0)
        .bind(role_id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        let assignment_user: Uuid = row.try_get("user_id").map_err(db_err)?;
        let assignment_role: Uuid = row.try_get("role_id").map_err(db_err)?;

        Ok(RoleAssignment {
            id: row.try_get("id").map_err(db_err)?,
            user_id: UserId(assignment_user),
            role_id: RoleId(assignment_role),
            active: row.try_get("active").map_err(db_err)?,
            created_at: row.try_get("created_at").map_err(db_err)?,
            updated_at: row.try_get("updated_at").map_err(db_err)?,
        })
    }
}
