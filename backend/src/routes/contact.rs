//! Contact form routes
//!
//! Public submission plus the admin inbox and CSV export.

use crate::auth::RequireAdmin;
use crate::error::ApiResult;
use crate::services::ContactService;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use portfolio_shared::models::ContactMessage;
use portfolio_shared::types::{
    ContactListQuery, ContactMessageRequest, MessageResponse, PaginatedResponse,
};
use uuid::Uuid;

/// Create contact routes
pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_message).get(list_messages))
        .route("/export", get(export_messages))
        .route("/:id/read", put(mark_read))
}

/// Accept a contact form submission
///
/// POST /api/contact
async fn submit_message(
    State(state): State<AppState>,
    Json(req): Json<ContactMessageRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let response = ContactService::submit(state.db(), &req).await?;
    Ok(Json(response))
}

/// List messages for the admin inbox
///
/// GET /api/contact
async fn list_messages(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<ContactListQuery>,
) -> ApiResult<Json<PaginatedResponse<ContactMessage>>> {
    let response = ContactService::list(state.db(), &query).await?;
    Ok(Json(response))
}

/// Download the full message history as CSV
///
/// GET /api/contact/export
async fn export_messages(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> ApiResult<impl IntoResponse> {
    let csv = ContactService::export_csv(state.db()).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"contact-messages.csv\"",
            ),
        ],
        csv,
    ))
}

/// Mark a message as read
///
/// PUT /api/contact/:id/read
async fn mark_read(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ContactMessage>> {
    let message = ContactService::mark_read(state.db(), id).await?;
    Ok(Json(message))
}
