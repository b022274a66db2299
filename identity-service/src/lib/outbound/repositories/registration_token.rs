use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::registration::errors::TokenRepoError;
use crate::domain::registration::models::RegistrationToken;
use crate::domain::registration::models::RegistrationTokenId;
use crate::domain::registration::ports::RegistrationTokenRepository;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UserId;

pub struct PostgresRegistrationTokenRepository {
    pool: PgPool,
}

impl PostgresRegistrationTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_token(row: &PgRow) -> Result<RegistrationToken, TokenRepoError> {
        let id: Uuid = row.try_get("id").map_err(db_err)?;
        let email: String = row.try_get("email").map_err(db_err)?;
        let created_by: Uuid = row.try_get("created_by").map_err(db_err)?;

        Ok(RegistrationToken {
            id: RegistrationTokenId(id),
            token: row.try_get("token").map_err(db_err)?,
            email: EmailAddress::new(email)
                .map_err(|e| TokenRepoError::Database(e.to_string()))?,
            expires_at: row.try_get("expires_at").map_err(db_err)?,
            created_at: row.try_get("created_at").map_err(db_err)?,
            created_by: UserId(created_by),
        })
    }
}

fn db_err(e: sqlx::Error) -> TokenRepoError {
    TokenRepoError::Database(e.to_string())
}

const SELECT_TOKEN: &str = r#"
    SELECT id, token, email, expires_at, created_at, created_by
    FROM registration_tokens
"#;

#[async_trait]
impl RegistrationTokenRepository for PostgresRegistrationTokenRepository {
    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<RegistrationToken>, TokenRepoError> {
        let row = sqlx::query(&format!("{} WHERE token = $1", SELECT_TOKEN))
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<RegistrationToken>, TokenRepoError> {
        let row = sqlx::query(&format!("{} WHERE email = $1", SELECT_TOKEN))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn insert(
        &self,
        token: RegistrationToken,
        now: DateTime<Utc>,
    ) -> Result<RegistrationToken, TokenRepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Clear an expired predecessor inside the same transaction so
        // the unique email guard only ever blocks on an active row.
        sqlx::query("DELETE FROM registration_tokens WHERE email = $1 AND expires_at <= $2")
            .bind(token.email.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let result = sqlx::query(
            r#"
            INSERT INTO registration_tokens (id, token, email, expires_at, created_at, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(token.id.0)
        .bind(&token.token)
        .bind(token.email.as_str())
        .bind(token.expires_at)
        .bind(token.created_at)
        .bind(token.created_by.0)
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {
                tx.commit().await.map_err(db_err)?;
                Ok(token)
            }
            Err(sqlx::Error::Database(e)) => match e.constraint() {
                Some("registration_tokens_email_key") => Err(TokenRepoError::EmailConflict),
                Some("registration_tokens_token_key") => Err(TokenRepoError::ValueCollision),
                _ => Err(TokenRepoError::Database(e.to_string())),
            },
            Err(e) => Err(db_err(e)),
        }
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenRepoError> {
        let result = sqlx::query("DELETE FROM registration_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected())
    }
}
