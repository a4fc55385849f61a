//! Users repository for database operations

use chrono::Utc;
use sqlx::{Pool, Sqlite};

use super::is_unique_violation;
use crate::{
    error::{AppError, AppResult},
    models::user::{User, DUPLICATE_USERNAME},
    policy::Capability,
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Sqlite>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username (authentication lookup)
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Create an account from an already hashed password
    pub async fn create(
        &self,
        username: &str,
        first_name: &str,
        last_name: &str,
        password_hash: &str,
        is_superuser: bool,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, first_name, last_name, password_hash, is_superuser, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(first_name)
        .bind(last_name)
        .bind(password_hash)
        .bind(is_superuser)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::field("username", DUPLICATE_USERNAME)
            } else {
                AppError::Database(e)
            }
        })
    }

    /// Capabilities granted to a user. Unknown codenames are skipped.
    pub async fn capabilities(&self, user_id: i64) -> AppResult<Vec<Capability>> {
        let codenames: Vec<String> = sqlx::query_scalar(
            "SELECT codename FROM user_capabilities WHERE user_id = $1 ORDER BY codename",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(codenames
            .iter()
            .filter_map(|c| match c.parse::<Capability>() {
                Ok(cap) => Some(cap),
                Err(e) => {
                    tracing::warn!("Ignoring capability for user {}: {}", user_id, e);
                    None
                }
            })
            .collect())
    }

    /// Replace the capability set and superuser flag of a user
    pub async fn set_capabilities(
        &self,
        user_id: i64,
        capabilities: &[Capability],
        is_superuser: bool,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE users SET is_superuser = $1 WHERE id = $2")
            .bind(is_superuser)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", user_id)));
        }

        sqlx::query("DELETE FROM user_capabilities WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for capability in capabilities {
            sqlx::query("INSERT OR IGNORE INTO user_capabilities (user_id, codename) VALUES ($1, $2)")
                .bind(user_id)
                .bind(capability.codename())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
