//! Contact message repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Contact message record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContactRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Contact message repository for database operations
pub struct ContactRepository;

impl ContactRepository {
    /// Store a submitted message
    pub async fn create(
        pool: &PgPool,
        name: &str,
        email: &str,
        subject: Option<&str>,
        message: &str,
    ) -> Result<ContactRecord> {
        let record = sqlx::query_as::<_, ContactRecord>(
            r#"
            INSERT INTO contact_messages (name, email, subject, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, subject, message, read, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(subject)
        .bind(message)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// List messages, newest first
    pub async fn list(
        pool: &PgPool,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ContactRecord>, i64)> {
        let count_row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) as count
            FROM contact_messages
            WHERE read = FALSE OR $1 = FALSE
            "#,
        )
        .bind(unread_only)
        .fetch_one(pool)
        .await?;

        let records = sqlx::query_as::<_, ContactRecord>(
            r#"
            SELECT id, name, email, subject, message, read, created_at
            FROM contact_messages
            WHERE read = FALSE OR $1 = FALSE
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(unread_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok((records, count_row.0))
    }

    /// List every message for export, oldest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<ContactRecord>> {
        let records = sqlx::query_as::<_, ContactRecord>(
            r#"
            SELECT id, name, email, subject, message, read, created_at
            FROM contact_messages
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Mark a message as read
    pub async fn mark_read(pool: &PgPool, id: Uuid) -> Result<Option<ContactRecord>> {
        let record = sqlx::query_as::<_, ContactRecord>(
            r#"
            UPDATE contact_messages
            SET read = TRUE
            WHERE id = $1
            RETURNING id, name, email, subject, message, read, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }
}
