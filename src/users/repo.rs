use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{User, UserPatch};

/// A unique constraint rejected the write (duplicate username or email).
#[derive(Debug, thiserror::Error)]
#[error("unique constraint violated: {constraint}")]
pub struct UniqueViolation {
    pub constraint: String,
}

/// Point operations on the `users` table.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> anyhow::Result<User>;
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn list(&self) -> anyhow::Result<Vec<User>>;
    /// Returns `None` when no row has this id.
    async fn update(&self, id: i32, patch: &UserPatch) -> anyhow::Result<Option<User>>;
    /// Returns `false` when no row has this id.
    async fn delete(&self, id: i32) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn classify(err: sqlx::Error, op: &'static str) -> anyhow::Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique").to_string();
            return anyhow::Error::new(UniqueViolation { constraint });
        }
    }
    anyhow::Error::new(err).context(op)
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> anyhow::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, email)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, email, is_active, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .fetch_one(&self.db)
        .await
        .map_err(|e| classify(e, "insert user"))
    }

    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, email, is_active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, email, is_active, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .context("find user by username")?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, email, is_active, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, email, is_active, created_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list users")?;
        Ok(rows)
    }

    async fn update(&self, id: i32, patch: &UserPatch) -> anyhow::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET username      = COALESCE($2, username),
                   is_active     = COALESCE($3, is_active),
                   password_hash = COALESCE($4, password_hash)
             WHERE id = $1
            RETURNING id, username, password_hash, email, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(patch.username.as_deref())
        .bind(patch.is_active)
        .bind(patch.password_hash.as_deref())
        .fetch_optional(&self.db)
        .await
        .map_err(|e| classify(e, "update user"))
    }

    async fn delete(&self, id: i32) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete user")?;
        Ok(res.rows_affected() > 0)
    }
}
