//! Blog comment service
//!
//! Comments hang off published posts. Deletion is restricted to the
//! comment owner or an admin.

use crate::auth::Identity;
use crate::error::ApiError;
use crate::repositories::{BlogRepository, CommentRecord, CommentRepository};
use portfolio_shared::models::{Comment, Role};
use portfolio_shared::types::{CreateCommentRequest, MessageResponse};
use portfolio_shared::validation;
use sqlx::PgPool;
use uuid::Uuid;

/// Comment service for blog post discussions
pub struct CommentService;

impl CommentService {
    /// Add a comment to a published post
    pub async fn create(
        pool: &PgPool,
        blog_post_id: Uuid,
        user_id: Uuid,
        request: &CreateCommentRequest,
    ) -> Result<Comment, ApiError> {
        validation::validate_message_body(&request.body).map_err(|message| {
            ApiError::FieldValidation {
                field: "body".to_string(),
                message,
            }
        })?;

        let exists = BlogRepository::find_by_id(pool, blog_post_id)
            .await?
            .map(|post| post.published)
            .unwrap_or(false);
        if !exists {
            return Err(ApiError::NotFound("Blog post not found".to_string()));
        }

        let record =
            CommentRepository::create(pool, blog_post_id, user_id, request.body.trim()).await?;

        Ok(comment_from(record))
    }

    /// List comments on a post, oldest first
    pub async fn list_for_post(pool: &PgPool, blog_post_id: Uuid) -> Result<Vec<Comment>, ApiError> {
        if BlogRepository::find_by_id(pool, blog_post_id).await?.is_none() {
            return Err(ApiError::NotFound("Blog post not found".to_string()));
        }

        let records = CommentRepository::list_for_post(pool, blog_post_id).await?;

        Ok(records.into_iter().map(comment_from).collect())
    }

    /// Delete a comment as its owner or as an admin
    pub async fn delete(
        pool: &PgPool,
        id: Uuid,
        caller: &Identity,
    ) -> Result<MessageResponse, ApiError> {
        let record = CommentRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

        if caller.role != Role::Admin && record.user_id != caller.id {
            return Err(ApiError::Forbidden(
                "You can only delete your own comments".to_string(),
            ));
        }

        CommentRepository::delete(pool, id).await?;

        Ok(MessageResponse::new("Comment deleted"))
    }
}

fn comment_from(record: CommentRecord) -> Comment {
    Comment {
        id: record.id,
        blog_post_id: record.blog_post_id,
        user_id: record.user_id,
        author_name: record.author_name,
        body: record.body,
        created_at: record.created_at,
    }
}
