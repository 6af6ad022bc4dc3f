//! Project repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Project record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub repo_url: Option<String>,
    pub live_url: Option<String>,
    pub featured: bool,
    pub average_rating: Option<f64>,
    pub total_ratings: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub repo_url: Option<String>,
    pub live_url: Option<String>,
    pub featured: bool,
}

/// Input for updating a project
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub repo_url: Option<String>,
    pub live_url: Option<String>,
    pub featured: Option<bool>,
}

/// Project repository for database operations
pub struct ProjectRepository;

impl ProjectRepository {
    /// List projects, featured first, then newest
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ProjectRecord>, i64)> {
        let count_row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) as count
            FROM projects
            "#,
        )
        .fetch_one(pool)
        .await?;

        let records = sqlx::query_as::<_, ProjectRecord>(
            r#"
            SELECT id, slug, title, description, tech_stack, repo_url, live_url,
                   featured, average_rating, total_ratings, created_at, updated_at
            FROM projects
            ORDER BY featured DESC, created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok((records, count_row.0))
    }

    /// Find project by slug
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<ProjectRecord>> {
        let project = sqlx::query_as::<_, ProjectRecord>(
            r#"
            SELECT id, slug, title, description, tech_stack, repo_url, live_url,
                   featured, average_rating, total_ratings, created_at, updated_at
            FROM projects
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Find project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ProjectRecord>> {
        let project = sqlx::query_as::<_, ProjectRecord>(
            r#"
            SELECT id, slug, title, description, tech_stack, repo_url, live_url,
                   featured, average_rating, total_ratings, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Check if slug exists
    pub async fn slug_exists(pool: &PgPool, slug: &str) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM projects WHERE slug = $1)
            "#,
        )
        .bind(slug)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }

    /// Create a new project
    pub async fn create(pool: &PgPool, input: CreateProject) -> Result<ProjectRecord> {
        let project = sqlx::query_as::<_, ProjectRecord>(
            r#"
            INSERT INTO projects (slug, title, description, tech_stack,
                                  repo_url, live_url, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, slug, title, description, tech_stack, repo_url, live_url,
                      featured, average_rating, total_ratings, created_at, updated_at
            "#,
        )
        .bind(input.slug)
        .bind(input.title)
        .bind(input.description)
        .bind(input.tech_stack)
        .bind(input.repo_url)
        .bind(input.live_url)
        .bind(input.featured)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Update project fields, leaving unset ones untouched
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        updates: UpdateProject,
    ) -> Result<Option<ProjectRecord>> {
        let project = sqlx::query_as::<_, ProjectRecord>(
            r#"
            UPDATE projects SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                tech_stack = COALESCE($4, tech_stack),
                repo_url = COALESCE($5, repo_url),
                live_url = COALESCE($6, live_url),
                featured = COALESCE($7, featured),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, slug, title, description, tech_stack, repo_url, live_url,
                      featured, average_rating, total_ratings, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(updates.title)
        .bind(updates.description)
        .bind(updates.tech_stack)
        .bind(updates.repo_url)
        .bind(updates.live_url)
        .bind(updates.featured)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Delete a project
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM projects WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Upsert the user's rating and recompute the aggregates. One row per
    /// (project, user): a repeat rating replaces the previous value. Returns
    /// the new (average, total), or None when the project does not exist.
    pub async fn rate(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
        rating: i32,
    ) -> Result<Option<(Option<f64>, i64)>> {
        let mut tx = pool.begin().await?;

        // Lock the project row so concurrent ratings serialize on the aggregates
        let project = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM projects WHERE id = $1 FOR UPDATE
            "#,
        )
        .bind(project_id)
        .fetch_optional(&mut *tx)
        .await?;

        if project.is_none() {
            return Ok(None);
        }

        sqlx::query(
            r#"
            INSERT INTO project_ratings (project_id, user_id, rating)
            VALUES ($1, $2, $3)
            ON CONFLICT (project_id, user_id) DO UPDATE SET
                rating = EXCLUDED.rating,
                updated_at = NOW()
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(rating)
        .execute(&mut *tx)
        .await?;

        let aggregates: (Option<f64>, i64) = sqlx::query_as(
            r#"
            UPDATE projects
            SET average_rating = sub.avg_rating,
                total_ratings = sub.rating_count,
                updated_at = NOW()
            FROM (
                SELECT AVG(rating)::float8 AS avg_rating,
                       COUNT(*) AS rating_count
                FROM project_ratings
                WHERE project_id = $1
            ) AS sub
            WHERE id = $1
            RETURNING average_rating, total_ratings
            "#,
        )
        .bind(project_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(aggregates))
    }
}
