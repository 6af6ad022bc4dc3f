//! Blog post routes
//!
//! Public reads, admin lifecycle management, user likes, and the
//! per-post comment surface.

use crate::auth::{RequireAdmin, RequireUser};
use crate::error::ApiResult;
use crate::services::BlogService;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use portfolio_shared::models::BlogPost;
use portfolio_shared::types::{
    CreateBlogPostRequest, LikeResponse, MessageResponse, PaginatedResponse, Pagination,
    UpdateBlogPostRequest,
};
use uuid::Uuid;

use super::comment::{create_comment, list_comments};

/// Create blog routes
pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_blogs).post(create_blog))
        .route("/:id", get(get_blog).put(update_blog).delete(delete_blog))
        .route("/:id/like", post(toggle_like))
        .route("/:id/comments", get(list_comments).post(create_comment))
}

/// List published posts
///
/// GET /api/blogs
async fn list_blogs(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<PaginatedResponse<BlogPost>>> {
    let response = BlogService::list(state.db(), pagination).await?;
    Ok(Json(response))
}

/// Fetch one published post by slug
///
/// GET /api/blogs/:slug
async fn get_blog(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<BlogPost>> {
    let post = BlogService::get(state.db(), &slug).await?;
    Ok(Json(post))
}

/// Create a post
///
/// POST /api/blogs
async fn create_blog(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(req): Json<CreateBlogPostRequest>,
) -> ApiResult<Json<BlogPost>> {
    let post = BlogService::create(state.db(), req).await?;
    Ok(Json(post))
}

/// Update a post
///
/// PUT /api/blogs/:id
async fn update_blog(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBlogPostRequest>,
) -> ApiResult<Json<BlogPost>> {
    let post = BlogService::update(state.db(), id, req).await?;
    Ok(Json(post))
}

/// Delete a post
///
/// DELETE /api/blogs/:id
async fn delete_blog(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let response = BlogService::delete(state.db(), id).await?;
    Ok(Json(response))
}

/// Toggle the caller's like
///
/// POST /api/blogs/:id/like
async fn toggle_like(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LikeResponse>> {
    let response = BlogService::toggle_like(state.db(), id, identity.id).await?;
    Ok(Json(response))
}
