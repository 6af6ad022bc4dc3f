//! Testimonial routes
//!
//! Public listing shows approved entries only; an admin bearer on the
//! same listing also sees the moderation queue.

use crate::auth::{RequireAdmin, RequireUser};
use crate::error::ApiResult;
use crate::services::TestimonialService;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use portfolio_shared::models::Testimonial;
use portfolio_shared::types::{CreateTestimonialRequest, MessageResponse};
use uuid::Uuid;

/// Create testimonial routes
pub fn testimonial_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_testimonials).post(create_testimonial))
        .route("/:id/approve", put(approve_testimonial))
        .route("/:id", delete(delete_testimonial))
}

/// List testimonials
///
/// GET /api/testimonials
async fn list_testimonials(
    State(state): State<AppState>,
    admin: Option<RequireAdmin>,
) -> ApiResult<Json<Vec<Testimonial>>> {
    let testimonials = TestimonialService::list(state.db(), admin.is_some()).await?;
    Ok(Json(testimonials))
}

/// Submit a testimonial for moderation
///
/// POST /api/testimonials
async fn create_testimonial(
    State(state): State<AppState>,
    RequireUser(_identity): RequireUser,
    Json(req): Json<CreateTestimonialRequest>,
) -> ApiResult<Json<Testimonial>> {
    let testimonial = TestimonialService::create(state.db(), &req).await?;
    Ok(Json(testimonial))
}

/// Approve a testimonial
///
/// PUT /api/testimonials/:id/approve
async fn approve_testimonial(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Testimonial>> {
    let testimonial = TestimonialService::approve(state.db(), id).await?;
    Ok(Json(testimonial))
}

/// Delete a testimonial
///
/// DELETE /api/testimonials/:id
async fn delete_testimonial(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let response = TestimonialService::delete(state.db(), id).await?;
    Ok(Json(response))
}
