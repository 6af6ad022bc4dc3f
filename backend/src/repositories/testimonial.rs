//! Testimonial repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Testimonial record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TestimonialRecord {
    pub id: Uuid,
    pub author_name: String,
    pub author_role: Option<String>,
    pub company: Option<String>,
    pub quote: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Testimonial repository for database operations
pub struct TestimonialRepository;

impl TestimonialRepository {
    /// List testimonials, newest first; approved only unless moderating
    pub async fn list(pool: &PgPool, approved_only: bool) -> Result<Vec<TestimonialRecord>> {
        let records = sqlx::query_as::<_, TestimonialRecord>(
            r#"
            SELECT id, author_name, author_role, company, quote, approved, created_at
            FROM testimonials
            WHERE approved = TRUE OR $1 = FALSE
            ORDER BY created_at DESC
            "#,
        )
        .bind(approved_only)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Create a testimonial; lands unapproved
    pub async fn create(
        pool: &PgPool,
        author_name: &str,
        author_role: Option<&str>,
        company: Option<&str>,
        quote: &str,
    ) -> Result<TestimonialRecord> {
        let record = sqlx::query_as::<_, TestimonialRecord>(
            r#"
            INSERT INTO testimonials (author_name, author_role, company, quote)
            VALUES ($1, $2, $3, $4)
            RETURNING id, author_name, author_role, company, quote, approved, created_at
            "#,
        )
        .bind(author_name)
        .bind(author_role)
        .bind(company)
        .bind(quote)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Approve a testimonial
    pub async fn approve(pool: &PgPool, id: Uuid) -> Result<Option<TestimonialRecord>> {
        let record = sqlx::query_as::<_, TestimonialRecord>(
            r#"
            UPDATE testimonials
            SET approved = TRUE
            WHERE id = $1
            RETURNING id, author_name, author_role, company, quote, approved, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Delete a testimonial
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM testimonials WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
