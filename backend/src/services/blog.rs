//! Blog post service
//!
//! Public read surface exposes published posts only. Admin routes manage
//! the full lifecycle; likes are toggled per user and keep the denormalized
//! count on the post row in step with the user's liked array.

use crate::error::ApiError;
use crate::repositories::{BlogPostRecord, BlogRepository, CreateBlogPost, UpdateBlogPost};
use portfolio_shared::models::BlogPost;
use portfolio_shared::types::{
    CreateBlogPostRequest, LikeResponse, MessageResponse, PaginatedResponse, Pagination,
    UpdateBlogPostRequest,
};
use portfolio_shared::validation;
use sqlx::PgPool;
use uuid::Uuid;

/// Blog service for post management and likes
pub struct BlogService;

impl BlogService {
    /// List published posts, newest first
    pub async fn list(
        pool: &PgPool,
        pagination: Pagination,
    ) -> Result<PaginatedResponse<BlogPost>, ApiError> {
        let page = pagination.page.max(1);
        let per_page = pagination.per_page.clamp(1, 100);
        let offset = ((page - 1) * per_page) as i64;

        let (records, total) =
            BlogRepository::list_published(pool, per_page as i64, offset).await?;

        Ok(paginated(records.into_iter().map(post_from).collect(), total, page, per_page))
    }

    /// Fetch a single published post by slug
    pub async fn get(pool: &PgPool, slug: &str) -> Result<BlogPost, ApiError> {
        let post = BlogRepository::find_by_slug(pool, slug)
            .await?
            .filter(|record| record.published)
            .ok_or_else(post_not_found)?;

        Ok(post_from(post))
    }

    /// Create a post, deriving the slug from the title when absent
    pub async fn create(
        pool: &PgPool,
        request: CreateBlogPostRequest,
    ) -> Result<BlogPost, ApiError> {
        validate_field("title", validation::validate_title(&request.title))?;
        if request.summary.trim().is_empty() {
            return Err(field_error("summary", "Summary is required"));
        }
        if request.body.trim().is_empty() {
            return Err(field_error("body", "Body is required"));
        }

        let slug = match request.slug {
            Some(slug) => slug,
            None => validation::slugify(&request.title),
        };
        validate_field("slug", validation::validate_slug(&slug))?;

        if BlogRepository::slug_exists(pool, &slug).await? {
            return Err(ApiError::Conflict("Slug already in use".to_string()));
        }

        let post = BlogRepository::create(
            pool,
            CreateBlogPost {
                slug,
                title: request.title,
                summary: request.summary,
                body: request.body,
                tags: request.tags,
                published: request.published,
            },
        )
        .await?;

        Ok(post_from(post))
    }

    /// Update post fields, leaving absent ones untouched
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        request: UpdateBlogPostRequest,
    ) -> Result<BlogPost, ApiError> {
        if let Some(title) = &request.title {
            validate_field("title", validation::validate_title(title))?;
        }
        if let Some(summary) = &request.summary {
            if summary.trim().is_empty() {
                return Err(field_error("summary", "Summary cannot be empty"));
            }
        }
        if let Some(body) = &request.body {
            if body.trim().is_empty() {
                return Err(field_error("body", "Body cannot be empty"));
            }
        }

        let post = BlogRepository::update(
            pool,
            id,
            UpdateBlogPost {
                title: request.title,
                summary: request.summary,
                body: request.body,
                tags: request.tags,
                published: request.published,
            },
        )
        .await?
        .ok_or_else(post_not_found)?;

        Ok(post_from(post))
    }

    /// Delete a post and its comments
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<MessageResponse, ApiError> {
        if !BlogRepository::delete(pool, id).await? {
            return Err(post_not_found());
        }

        Ok(MessageResponse::new("Blog post deleted"))
    }

    /// Toggle the caller's like on a post
    pub async fn toggle_like(
        pool: &PgPool,
        blog_id: Uuid,
        user_id: Uuid,
    ) -> Result<LikeResponse, ApiError> {
        let (liked, like_count) = BlogRepository::toggle_like(pool, blog_id, user_id)
            .await?
            .ok_or_else(post_not_found)?;

        Ok(LikeResponse { liked, like_count })
    }
}

fn post_from(record: BlogPostRecord) -> BlogPost {
    BlogPost {
        id: record.id,
        slug: record.slug,
        title: record.title,
        summary: record.summary,
        body: record.body,
        tags: record.tags,
        published: record.published,
        like_count: record.like_count,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

fn paginated<T>(data: Vec<T>, total: i64, page: u32, per_page: u32) -> PaginatedResponse<T> {
    let total = total.max(0) as u64;
    let total_pages = ((total + per_page as u64 - 1) / per_page as u64) as u32;
    PaginatedResponse {
        data,
        total,
        page,
        per_page,
        total_pages,
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

fn post_not_found() -> ApiError {
    ApiError::NotFound("Blog post not found".to_string())
}
