//! Blog post repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Blog post record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BlogPostRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub tags: Vec<String>,
    pub published: bool,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a blog post
#[derive(Debug, Clone)]
pub struct CreateBlogPost {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub tags: Vec<String>,
    pub published: bool,
}

/// Input for updating a blog post
#[derive(Debug, Clone, Default)]
pub struct UpdateBlogPost {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published: Option<bool>,
}

/// Blog post repository for database operations
pub struct BlogRepository;

impl BlogRepository {
    /// List published posts, newest first
    pub async fn list_published(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<BlogPostRecord>, i64)> {
        let count_row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) as count
            FROM blog_posts
            WHERE published = TRUE
            "#,
        )
        .fetch_one(pool)
        .await?;

        let records = sqlx::query_as::<_, BlogPostRecord>(
            r#"
            SELECT id, slug, title, summary, body, tags, published, like_count,
                   created_at, updated_at
            FROM blog_posts
            WHERE published = TRUE
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok((records, count_row.0))
    }

    /// Find post by slug
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<BlogPostRecord>> {
        let post = sqlx::query_as::<_, BlogPostRecord>(
            r#"
            SELECT id, slug, title, summary, body, tags, published, like_count,
                   created_at, updated_at
            FROM blog_posts
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(post)
    }

    /// Find post by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<BlogPostRecord>> {
        let post = sqlx::query_as::<_, BlogPostRecord>(
            r#"
            SELECT id, slug, title, summary, body, tags, published, like_count,
                   created_at, updated_at
            FROM blog_posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(post)
    }

    /// Check if slug exists
    pub async fn slug_exists(pool: &PgPool, slug: &str) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM blog_posts WHERE slug = $1)
            "#,
        )
        .bind(slug)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }

    /// Create a new post
    pub async fn create(pool: &PgPool, input: CreateBlogPost) -> Result<BlogPostRecord> {
        let post = sqlx::query_as::<_, BlogPostRecord>(
            r#"
            INSERT INTO blog_posts (slug, title, summary, body, tags, published)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, slug, title, summary, body, tags, published, like_count,
                      created_at, updated_at
            "#,
        )
        .bind(input.slug)
        .bind(input.title)
        .bind(input.summary)
        .bind(input.body)
        .bind(input.tags)
        .bind(input.published)
        .fetch_one(pool)
        .await?;

        Ok(post)
    }

    /// Update post fields, leaving unset ones untouched
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        updates: UpdateBlogPost,
    ) -> Result<Option<BlogPostRecord>> {
        let post = sqlx::query_as::<_, BlogPostRecord>(
            r#"
            UPDATE blog_posts SET
                title = COALESCE($2, title),
                summary = COALESCE($3, summary),
                body = COALESCE($4, body),
                tags = COALESCE($5, tags),
                published = COALESCE($6, published),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, slug, title, summary, body, tags, published, like_count,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(updates.title)
        .bind(updates.summary)
        .bind(updates.body)
        .bind(updates.tags)
        .bind(updates.published)
        .fetch_optional(pool)
        .await?;

        Ok(post)
    }

    /// Delete a post
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM blog_posts WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Toggle the user's like on a post; keeps the denormalized count in step
    /// with the user's liked list. Returns the new membership and count, or
    /// None when the post does not exist.
    pub async fn toggle_like(
        pool: &PgPool,
        blog_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<(bool, i64)>> {
        let mut tx = pool.begin().await?;

        // Lock the post row so concurrent toggles serialize on the count
        let post = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM blog_posts WHERE id = $1 FOR UPDATE
            "#,
        )
        .bind(blog_id)
        .fetch_optional(&mut *tx)
        .await?;

        if post.is_none() {
            return Ok(None);
        }

        let liked = sqlx::query_scalar::<_, bool>(
            r#"
            UPDATE users
            SET liked_blogs = CASE
                    WHEN $2 = ANY(liked_blogs) THEN array_remove(liked_blogs, $2)
                    ELSE array_append(liked_blogs, $2)
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING $2 = ANY(liked_blogs)
            "#,
        )
        .bind(user_id)
        .bind(blog_id)
        .fetch_one(&mut *tx)
        .await?;

        let like_count = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE blog_posts
            SET like_count = GREATEST(like_count + $2, 0), updated_at = NOW()
            WHERE id = $1
            RETURNING like_count
            "#,
        )
        .bind(blog_id)
        .bind(if liked { 1i64 } else { -1i64 })
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some((liked, like_count)))
    }
}
