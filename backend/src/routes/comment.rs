//! Comment routes
//!
//! The per-post handlers are mounted under the blog router; deletion has
//! its own path so the owner-or-admin check can run on the comment alone.

use crate::auth::{AuthUser, RequireUser};
use crate::error::ApiResult;
use crate::services::CommentService;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::routing::delete;
use axum::{Json, Router};
use portfolio_shared::models::Comment;
use portfolio_shared::types::{CreateCommentRequest, MessageResponse};
use uuid::Uuid;

/// Create comment routes
pub fn comment_routes() -> Router<AppState> {
    Router::new().route("/:id", delete(delete_comment))
}

/// List comments on a post
///
/// GET /api/blogs/:id/comments
pub(super) async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Comment>>> {
    let comments = CommentService::list_for_post(state.db(), id).await?;
    Ok(Json(comments))
}

/// Comment on a post
///
/// POST /api/blogs/:id/comments
pub(super) async fn create_comment(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<Json<Comment>> {
    let comment = CommentService::create(state.db(), id, identity.id, &req).await?;
    Ok(Json(comment))
}

/// Delete a comment as its owner or as an admin
///
/// DELETE /api/comments/:id
async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let response = CommentService::delete(state.db(), id, &identity).await?;
    Ok(Json(response))
}
