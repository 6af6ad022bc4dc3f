//! User repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use portfolio_shared::models::{SocialLinks, TokenState};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub active: bool,
    pub email_verified: bool,
    pub verification_token: Option<String>,
    pub verification_token_expires_at: Option<DateTime<Utc>>,
    pub reset_token: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub bio: Option<String>,
    pub social_links: Json<SocialLinks>,
    pub skills: Vec<String>,
    pub liked_blogs: Vec<Uuid>,
    pub bookmarked_projects: Vec<Uuid>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn reset_token_state(&self) -> TokenState {
        TokenState::from_columns(self.reset_token.clone(), self.reset_token_expires_at)
    }

    pub fn verification_token_state(&self) -> TokenState {
        TokenState::from_columns(
            self.verification_token.clone(),
            self.verification_token_expires_at,
        )
    }
}

/// Input for updating user profile fields
#[derive(Debug, Clone, Default)]
pub struct UpdateUserProfile {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub social_links: Option<Json<SocialLinks>>,
    pub skills: Option<Vec<String>>,
}

/// User repository for database operations
pub struct UserRepository;

impl UserRepository {
    /// Create a new user pending email verification
    pub async fn create(
        pool: &PgPool,
        email: &str,
        name: &str,
        password_hash: &str,
        verification_token: &str,
        verification_expires_at: DateTime<Utc>,
    ) -> Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (email, name, password_hash,
                               verification_token, verification_token_expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, name, password_hash, active, email_verified,
                      verification_token, verification_token_expires_at,
                      reset_token, reset_token_expires_at,
                      bio, social_links, skills, liked_blogs, bookmarked_projects,
                      last_login_at, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .bind(verification_token)
        .bind(verification_expires_at)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, name, password_hash, active, email_verified,
                   verification_token, verification_token_expires_at,
                   reset_token, reset_token_expires_at,
                   bio, social_links, skills, liked_blogs, bookmarked_projects,
                   last_login_at, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, name, password_hash, active, email_verified,
                   verification_token, verification_token_expires_at,
                   reset_token, reset_token_expires_at,
                   bio, social_links, skills, liked_blogs, bookmarked_projects,
                   last_login_at, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find user holding this reset token
    pub async fn find_by_reset_token(pool: &PgPool, token: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, name, password_hash, active, email_verified,
                   verification_token, verification_token_expires_at,
                   reset_token, reset_token_expires_at,
                   bio, social_links, skills, liked_blogs, bookmarked_projects,
                   last_login_at, created_at, updated_at
            FROM users
            WHERE reset_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find user holding this verification token
    pub async fn find_by_verification_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, name, password_hash, active, email_verified,
                   verification_token, verification_token_expires_at,
                   reset_token, reset_token_expires_at,
                   bio, social_links, skills, liked_blogs, bookmarked_projects,
                   last_login_at, created_at, updated_at
            FROM users
            WHERE verification_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Check if email exists
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }

    /// Record a successful login
    pub async fn touch_last_login(pool: &PgPool, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Replace the stored password hash
    pub async fn update_password_hash(pool: &PgPool, id: Uuid, password_hash: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
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

    /// Store a reset token, replacing any prior one
    pub async fn set_reset_token(
        pool: &PgPool,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
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

    /// Clear the reset token (consumption and rollback both land here)
    pub async fn clear_reset_token(pool: &PgPool, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET reset_token = NULL, reset_token_expires_at = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Store a fresh verification token, replacing any prior one
    pub async fn set_verification_token(
        pool: &PgPool,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET verification_token = $2, verification_token_expires_at = $3,
                updated_at = NOW()
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

    /// Mark the email verified and consume the verification token
    pub async fn mark_verified(pool: &PgPool, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET email_verified = TRUE,
                verification_token = NULL,
                verification_token_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Update profile fields, leaving unset ones untouched
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        updates: UpdateUserProfile,
    ) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                bio = COALESCE($3, bio),
                social_links = COALESCE($4, social_links),
                skills = COALESCE($5, skills),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, name, password_hash, active, email_verified,
                      verification_token, verification_token_expires_at,
                      reset_token, reset_token_expires_at,
                      bio, social_links, skills, liked_blogs, bookmarked_projects,
                      last_login_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(updates.name)
        .bind(updates.bio)
        .bind(updates.social_links)
        .bind(updates.skills)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Toggle a project in the user's bookmark list; returns the new membership
    pub async fn toggle_bookmarked_project(
        pool: &PgPool,
        user_id: Uuid,
        project_id: Uuid,
    ) -> Result<Option<bool>> {
        let bookmarked = sqlx::query_scalar::<_, bool>(
            r#"
            UPDATE users
            SET bookmarked_projects = CASE
                    WHEN $2 = ANY(bookmarked_projects)
                        THEN array_remove(bookmarked_projects, $2)
                    ELSE array_append(bookmarked_projects, $2)
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING $2 = ANY(bookmarked_projects)
            "#,
        )
        .bind(user_id)
        .bind(project_id)
        .fetch_optional(pool)
        .await?;

        Ok(bookmarked)
    }
}

#[cfg(test)]
mod tests {
    // Integration tests require database - marked with #[ignore]
    // Run with: cargo test --features integration -- --ignored
}
