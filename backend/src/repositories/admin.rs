//! Admin identity repository
//!
//! The admin row is seeded at startup from the configured credentials and
//! only ever updated in place after that.

use anyhow::Result;
use chrono::{DateTime, Utc};
use portfolio_shared::models::TokenState;
use sqlx::PgPool;
use uuid::Uuid;

/// Admin record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminRecord {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub reset_token: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminRecord {
    pub fn reset_token_state(&self) -> TokenState {
        TokenState::from_columns(self.reset_token.clone(), self.reset_token_expires_at)
    }
}

/// Admin repository for database operations
pub struct AdminRepository;

impl AdminRepository {
    /// Insert the admin identity or refresh its name on conflict
    pub async fn upsert(
        pool: &PgPool,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<AdminRecord> {
        let admin = sqlx::query_as::<_, AdminRecord>(
            r#"
            INSERT INTO admins (email, name, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE SET
                name = EXCLUDED.name,
                updated_at = NOW()
            RETURNING id, email, name, password_hash, active, last_login_at,
                      reset_token, reset_token_expires_at, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .fetch_one(pool)
        .await?;

        Ok(admin)
    }

    /// Find admin by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<AdminRecord>> {
        let admin = sqlx::query_as::<_, AdminRecord>(
            r#"
            SELECT id, email, name, password_hash, active, last_login_at,
                   reset_token, reset_token_expires_at, created_at, updated_at
            FROM admins
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(admin)
    }

    /// Find admin by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<AdminRecord>> {
        let admin = sqlx::query_as::<_, AdminRecord>(
            r#"
            SELECT id, email, name, password_hash, active, last_login_at,
                   reset_token, reset_token_expires_at, created_at, updated_at
            FROM admins
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(admin)
    }

    /// Find admin holding this reset token
    pub async fn find_by_reset_token(pool: &PgPool, token: &str) -> Result<Option<AdminRecord>> {
        let admin = sqlx::query_as::<_, AdminRecord>(
            r#"
            SELECT id, email, name, password_hash, active, last_login_at,
                   reset_token, reset_token_expires_at, created_at, updated_at
            FROM admins
            WHERE reset_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(admin)
    }

    /// Replace the stored password hash
    pub async fn update_password_hash(pool: &PgPool, id: Uuid, password_hash: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE admins
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Record a successful login
    pub async fn touch_last_login(pool: &PgPool, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE admins
            SET last_login_at = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Store a reset token, replacing any prior one
    pub async fn set_reset_token(
        pool: &PgPool,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE admins
            SET reset_token = $2, reset_token_expires_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Deactivate every admin row except the configured one
    pub async fn deactivate_others(pool: &PgPool, email: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE admins
            SET active = FALSE, updated_at = NOW()
            WHERE email <> $1 AND active = TRUE
            "#,
        )
        .bind(email)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Clear the reset token (consumption and rollback both land here)
    pub async fn clear_reset_token(pool: &PgPool, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE admins
            SET reset_token = NULL, reset_token_expires_at = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }
}
