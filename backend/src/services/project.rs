//! Project service
//!
//! Public read surface plus admin lifecycle management. Ratings are one
//! row per (project, user) pair; a repeat submission replaces the earlier
//! rating and the stored aggregates are recomputed from the surviving rows.

use crate::error::ApiError;
use crate::repositories::{
    CreateProject, ProjectRecord, ProjectRepository, UpdateProject, UserRepository,
};
use portfolio_shared::models::Project;
use portfolio_shared::types::{
    BookmarkResponse, CreateProjectRequest, MessageResponse, PaginatedResponse, Pagination,
    RatingResponse, UpdateProjectRequest,
};
use portfolio_shared::validation;
use sqlx::PgPool;
use uuid::Uuid;

/// Project service for portfolio entries, ratings, and bookmarks
pub struct ProjectService;

impl ProjectService {
    /// List projects, featured first
    pub async fn list(
        pool: &PgPool,
        pagination: Pagination,
    ) -> Result<PaginatedResponse<Project>, ApiError> {
        let page = pagination.page.max(1);
        let per_page = pagination.per_page.clamp(1, 100);
        let offset = ((page - 1) * per_page) as i64;

        let (records, total) = ProjectRepository::list(pool, per_page as i64, offset).await?;

        let total = total.max(0) as u64;
        let total_pages = ((total + per_page as u64 - 1) / per_page as u64) as u32;
        Ok(PaginatedResponse {
            data: records.into_iter().map(project_from).collect(),
            total,
            page,
            per_page,
            total_pages,
        })
    }

    /// Fetch a single project by slug
    pub async fn get(pool: &PgPool, slug: &str) -> Result<Project, ApiError> {
        let project = ProjectRepository::find_by_slug(pool, slug)
            .await?
            .ok_or_else(project_not_found)?;

        Ok(project_from(project))
    }

    /// Create a project, deriving the slug from the title when absent
    pub async fn create(
        pool: &PgPool,
        request: CreateProjectRequest,
    ) -> Result<Project, ApiError> {
        validate_field("title", validation::validate_title(&request.title))?;
        if request.description.trim().is_empty() {
            return Err(field_error("description", "Description is required"));
        }
        for url in [&request.repo_url, &request.live_url].into_iter().flatten() {
            validate_field("repoUrl", validation::validate_link(url))?;
        }

        let slug = match request.slug {
            Some(slug) => slug,
            None => validation::slugify(&request.title),
        };
        validate_field("slug", validation::validate_slug(&slug))?;

        if ProjectRepository::slug_exists(pool, &slug).await? {
            return Err(ApiError::Conflict("Slug already in use".to_string()));
        }

        let project = ProjectRepository::create(
            pool,
            CreateProject {
                slug,
                title: request.title,
                description: request.description,
                tech_stack: request.tech_stack,
                repo_url: request.repo_url,
                live_url: request.live_url,
                featured: request.featured,
            },
        )
        .await?;

        Ok(project_from(project))
    }

    /// Update project fields, leaving absent ones untouched
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        request: UpdateProjectRequest,
    ) -> Result<Project, ApiError> {
        if let Some(title) = &request.title {
            validate_field("title", validation::validate_title(title))?;
        }
        if let Some(description) = &request.description {
            if description.trim().is_empty() {
                return Err(field_error("description", "Description cannot be empty"));
            }
        }
        for url in [&request.repo_url, &request.live_url].into_iter().flatten() {
            validate_field("repoUrl", validation::validate_link(url))?;
        }

        let project = ProjectRepository::update(
            pool,
            id,
            UpdateProject {
                title: request.title,
                description: request.description,
                tech_stack: request.tech_stack,
                repo_url: request.repo_url,
                live_url: request.live_url,
                featured: request.featured,
            },
        )
        .await?
        .ok_or_else(project_not_found)?;

        Ok(project_from(project))
    }

    /// Delete a project and its ratings
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<MessageResponse, ApiError> {
        if !ProjectRepository::delete(pool, id).await? {
            return Err(project_not_found());
        }

        Ok(MessageResponse::new("Project deleted"))
    }

    /// Submit or replace the caller's rating and return the new aggregates
    pub async fn rate(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
        rating: i32,
    ) -> Result<RatingResponse, ApiError> {
        validate_field("rating", validation::validate_rating(rating))?;

        let (average_rating, total_ratings) =
            ProjectRepository::rate(pool, project_id, user_id, rating)
                .await?
                .ok_or_else(project_not_found)?;

        Ok(RatingResponse {
            message: "Rating recorded".to_string(),
            average_rating,
            total_ratings,
        })
    }

    /// Toggle the caller's bookmark on a project
    pub async fn toggle_bookmark(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<BookmarkResponse, ApiError> {
        if ProjectRepository::find_by_id(pool, project_id).await?.is_none() {
            return Err(project_not_found());
        }

        let bookmarked = UserRepository::toggle_bookmarked_project(pool, user_id, project_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(BookmarkResponse { bookmarked })
    }
}

fn project_from(record: ProjectRecord) -> Project {
    Project {
        id: record.id,
        slug: record.slug,
        title: record.title,
        description: record.description,
        tech_stack: record.tech_stack,
        repo_url: record.repo_url,
        live_url: record.live_url,
        featured: record.featured,
        average_rating: record.average_rating,
        total_ratings: record.total_ratings,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

fn validate_field(field: &str, result: Result<(), String>) -> Result<(), ApiError> {
    result.map_err(|message| field_error(field, &message))
}

fn field_error(field: &str, message: &str) -> ApiError {
    ApiError::FieldValidation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn project_not_found() -> ApiError {
    ApiError::NotFound("Project not found".to_string())
}

#[cfg(test)]
mod tests {
    // Rating aggregation is covered by the database integration tests
}
