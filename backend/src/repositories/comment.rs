//! Comment repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Comment record with the author's display name joined in
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRecord {
    pub id: Uuid,
    pub blog_post_id: Uuid,
    pub user_id: Uuid,
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Comment repository for database operations
pub struct CommentRepository;

impl CommentRepository {
    /// Create a comment on a post
    pub async fn create(
        pool: &PgPool,
        blog_post_id: Uuid,
        user_id: Uuid,
        body: &str,
    ) -> Result<CommentRecord> {
        let record = sqlx::query_as::<_, CommentRecord>(
            r#"
            INSERT INTO comments (blog_post_id, user_id, body)
            VALUES ($1, $2, $3)
            RETURNING id, blog_post_id, user_id,
                      (SELECT name FROM users WHERE id = $2) AS author_name,
                      body, created_at
            "#,
        )
        .bind(blog_post_id)
        .bind(user_id)
        .bind(body)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// List comments for a post, oldest first
    pub async fn list_for_post(pool: &PgPool, blog_post_id: Uuid) -> Result<Vec<CommentRecord>> {
        let records = sqlx::query_as::<_, CommentRecord>(
            r#"
            SELECT c.id, c.blog_post_id, c.user_id, u.name AS author_name,
                   c.body, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.blog_post_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(blog_post_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Find comment by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<CommentRecord>> {
        let record = sqlx::query_as::<_, CommentRecord>(
            r#"
            SELECT c.id, c.blog_post_id, c.user_id, u.name AS author_name,
                   c.body, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Delete a comment
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
