//! Project routes
//!
//! Public reads, admin lifecycle management, user ratings and bookmarks.

use crate::auth::{RequireAdmin, RequireUser};
use crate::error::ApiResult;
use crate::services::ProjectService;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use portfolio_shared::models::Project;
use portfolio_shared::types::{
    BookmarkResponse, CreateProjectRequest, MessageResponse, PaginatedResponse, Pagination,
    RateProjectRequest, RatingResponse, UpdateProjectRequest,
};
use uuid::Uuid;

/// Create project routes
pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/:id/rating", post(rate_project))
        .route("/:id/bookmark", post(toggle_bookmark))
}

/// List projects
///
/// GET /api/projects
async fn list_projects(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<PaginatedResponse<Project>>> {
    let response = ProjectService::list(state.db(), pagination).await?;
    Ok(Json(response))
}

/// Fetch one project by slug
///
/// GET /api/projects/:slug
async fn get_project(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Project>> {
    let project = ProjectService::get(state.db(), &slug).await?;
    Ok(Json(project))
}

/// Create a project
///
/// POST /api/projects
async fn create_project(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<Project>> {
    let project = ProjectService::create(state.db(), req).await?;
    Ok(Json(project))
}

/// Update a project
///
/// PUT /api/projects/:id
async fn update_project(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    let project = ProjectService::update(state.db(), id, req).await?;
    Ok(Json(project))
}

/// Delete a project
///
/// DELETE /api/projects/:id
async fn delete_project(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let response = ProjectService::delete(state.db(), id).await?;
    Ok(Json(response))
}

/// Submit or replace the caller's rating
///
/// POST /api/projects/:id/rating
async fn rate_project(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
    Path(id): Path<Uuid>,
    Json(req): Json<RateProjectRequest>,
) -> ApiResult<Json<RatingResponse>> {
    let response = ProjectService::rate(state.db(), id, identity.id, req.rating).await?;
    Ok(Json(response))
}

/// Toggle the caller's bookmark
///
/// POST /api/projects/:id/bookmark
async fn toggle_bookmark(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BookmarkResponse>> {
    let response = ProjectService::toggle_bookmark(state.db(), id, identity.id).await?;
    Ok(Json(response))
}
