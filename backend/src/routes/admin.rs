//! Admin authentication routes
//!
//! The single admin identity is provisioned at startup; these routes
//! authenticate it and manage its password lifecycle. Login answers with
//! the token pair in the body and also installs the refresh token as an
//! HttpOnly cookie.

use crate::auth::{
    clear_refresh_cookie, client_ip, refresh_cookie, refresh_token_from_cookies, RequireAdmin,
};
use crate::error::{ApiError, ApiResult};
use crate::services::{AdminService, SessionService};
use crate::state::AppState;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use portfolio_shared::models::Role;
use portfolio_shared::types::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, RefreshRequest, RefreshResponse,
    ResetPasswordRequest,
};
use std::net::SocketAddr;

/// Create admin auth routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/verify-reset-token/:token", get(verify_reset_token))
}

/// Admin login
///
/// POST /api/admin/login
async fn login(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let ip = client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    let response = AdminService::login(&state, ip, &req).await?;

    let cookie = refresh_cookie(
        &response.refresh_token,
        state.config().jwt.refresh_token_expiry_secs,
    );
    Ok(([(header::SET_COOKIE, cookie)], Json(response)))
}

/// Admin logout, revoking the current refresh token
///
/// POST /api/admin/logout
async fn logout(
    State(state): State<AppState>,
    RequireAdmin(identity): RequireAdmin,
) -> ApiResult<impl IntoResponse> {
    let response = SessionService::logout(&state, &identity).await?;
    Ok(([(header::SET_COOKIE, clear_refresh_cookie())], Json(response)))
}

/// Exchange a refresh token for a new access token
///
/// POST /api/admin/refresh
///
/// The refresh token is read from the JSON body when present, falling
/// back to the HttpOnly cookie set at login.
async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> ApiResult<Json<RefreshResponse>> {
    let token = body
        .and_then(|Json(req)| req.refresh_token)
        .or_else(|| refresh_token_from_cookies(&headers))
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

    let response = SessionService::refresh(&state, Role::Admin, &token).await?;
    Ok(Json(response))
}

/// Request a password-reset link
///
/// POST /api/admin/forgot-password
async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let response = AdminService::forgot_password(&state, &req.email).await?;
    Ok(Json(response))
}

/// Complete a password reset
///
/// POST /api/admin/reset-password
async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let response = AdminService::reset_password(&state, &req.token, &req.password).await?;
    Ok(Json(response))
}

/// Check a reset token before showing the reset form
///
/// GET /api/admin/verify-reset-token/:token
async fn verify_reset_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let response = AdminService::verify_reset_token(&state, &token).await?;
    Ok(Json(response))
}
