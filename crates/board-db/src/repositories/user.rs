//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use board_core::entities::User;
use board_core::error::DomainError;
use board_core::traits::{RepoResult, UserRepository};
use board_core::value_objects::Snowflake;

use crate::models::UserModel;

use super::error::{map_db_error, map_unique_violation, user_not_found};

const USER_COLUMNS: &str = r"
    SELECT id, username, email, role, enabled, registration_ip, last_login_ip,
           last_login_at, created_at, updated_at
    FROM users
";

fn duplicate_user(constraint: Option<&str>) -> DomainError {
    match constraint {
        Some("users_email_key") => DomainError::EmailExists,
        _ => DomainError::UsernameExists,
    }
}

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        let sql = format!("{USER_COLUMNS} WHERE id = $1");
        let result = sqlx::query_as::<_, UserModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let sql = format!("{USER_COLUMNS} WHERE username = $1");
        let result = sqlx::query_as::<_, UserModel>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let sql = format!("{USER_COLUMNS} WHERE LOWER(email) = LOWER($1)");
        let result = sqlx::query_as::<_, UserModel>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> RepoResult<Vec<User>> {
        let sql = format!("{USER_COLUMNS} ORDER BY username");
        let results = sqlx::query_as::<_, UserModel>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(results.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self, user, password_hash), fields(username = %user.username))]
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO users (id, username, email, password_hash, role, enabled,
                               registration_ip, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(user.id.into_inner())
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash)
        .bind(user.role.as_str())
        .bind(user.enabled)
        .bind(&user.registration_ip)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, duplicate_user))?;

        Ok(())
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: &User) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET email = $2, role = $3, enabled = $4, last_login_ip = $5, last_login_at = $6,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(user.id.into_inner())
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(user.enabled)
        .bind(&user.last_login_ip)
        .bind(user.last_login_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, duplicate_user))?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(user.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self, password_hash))]
    async fn update_password(&self, id: Snowflake, password_hash: &str) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
        }

        Ok(())
    }

    /// Tokens go with the row through the cascade
    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
        }

        Ok(())
    }
}
