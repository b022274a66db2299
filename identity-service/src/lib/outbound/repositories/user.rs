use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use crate::domain::user::errors::UserError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &PgRow) -> Result<User, UserError> {
        let id: uuid::Uuid = row.try_get("id").map_err(db_err)?;
        let username: String = row.try_get("username").map_err(db_err)?;
        let email: String = row.try_get("email").map_err(db_err)?;

        Ok(User {
            id: UserId(id),
            username: Username::new(username)?,
            email: EmailAddress::new(email)?,
            password_hash: row.try_get("password_hash").map_err(db_err)?,
            active: row.try_get("active").map_err(db_err)?,
            created_at: row.try_get("created_at").map_err(db_err)?,
            updated_at: row.try_get("updated_at").map_err(db_err)?,
        })
    }
}

fn db_err(e: sqlx::Error) -> UserError {
    UserError::DatabaseError(e.to_string())
}

const SELECT_USER: &str = r#"
    SELECT id, username, email, password_hash, active, created_at, updated_at
    FROM users
"#;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.0)
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(sqlx::Error::Database(e)) => match e.constraint() {
                Some("users_username_key") => {
                    Err(UserError::UsernameAlreadyExists(user.username.to_string()))
                }
                Some("users_email_key") => {
                    Err(UserError::EmailAlreadyExists(user.email.to_string()))
                }
                _ => Err(UserError::DatabaseError(e.to_string())),
            },
            Err(e) => Err(db_err(e)),
        }
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_USER))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let row = sqlx::query(&format!("{} WHERE username = $1", SELECT_USER))
            .bind(username.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let row = sqlx::query(&format!("{} WHERE email = $1", SELECT_USER))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        row.try_get(0).map_err(db_err)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, UserError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        row.try_get(0).map_err(db_err)
    }
}
