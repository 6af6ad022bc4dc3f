//! User account routes
//!
//! Mirrors the admin auth family and adds signup, email verification,
//! and profile management.

use crate::auth::{
    clear_refresh_cookie, client_ip, refresh_cookie, refresh_token_from_cookies, RequireUser,
};
use crate::error::{ApiError, ApiResult};
use crate::services::{SessionService, UserService};
use crate::state::AppState;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use portfolio_shared::models::Role;
use portfolio_shared::types::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, RefreshRequest, RefreshResponse,
    ResendVerificationRequest, ResetPasswordRequest, SignupRequest, UpdateProfileRequest,
    UserProfileResponse,
};
use std::net::SocketAddr;

/// Create user account routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/verify-email/:token", get(verify_email))
        .route("/resend-verification", post(resend_verification))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/verify-reset-token/:token", get(verify_reset_token))
        .route("/me", get(me))
        .route("/profile", put(update_profile))
}

/// Register a new account
///
/// POST /api/user/signup
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let response = UserService::signup(&state, &req).await?;
    Ok(Json(response))
}

/// Consume an email-verification token
///
/// GET /api/user/verify-email/:token
async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let response = UserService::verify_email(&state, &token).await?;
    Ok(Json(response))
}

/// Issue a fresh verification token
///
/// POST /api/user/resend-verification
async fn resend_verification(
    State(state): State<AppState>,
    Json(req): Json<ResendVerificationRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let response = UserService::resend_verification(&state, &req.email).await?;
    Ok(Json(response))
}

/// User login
///
/// POST /api/user/login
async fn login(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let ip = client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    let response = UserService::login(&state, ip, &req).await?;

    let cookie = refresh_cookie(
        &response.refresh_token,
        state.config().jwt.refresh_token_expiry_secs,
    );
    Ok(([(header::SET_COOKIE, cookie)], Json(response)))
}

/// User logout, revoking the current refresh token
///
/// POST /api/user/logout
async fn logout(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
) -> ApiResult<impl IntoResponse> {
    let response = SessionService::logout(&state, &identity).await?;
    Ok(([(header::SET_COOKIE, clear_refresh_cookie())], Json(response)))
}

/// Exchange a refresh token for a new access token
///
/// POST /api/user/refresh
async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> ApiResult<Json<RefreshResponse>> {
    let token = body
        .and_then(|Json(req)| req.refresh_token)
        .or_else(|| refresh_token_from_cookies(&headers))
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

    let response = SessionService::refresh(&state, Role::User, &token).await?;
    Ok(Json(response))
}

/// Request a password-reset link
///
/// POST /api/user/forgot-password
async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let response = UserService::forgot_password(&state, &req.email).await?;
    Ok(Json(response))
}

/// Complete a password reset
///
/// POST /api/user/reset-password
async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let response = UserService::reset_password(&state, &req.token, &req.password).await?;
    Ok(Json(response))
}

/// Check a reset token before showing the reset form
///
/// GET /api/user/verify-reset-token/:token
async fn verify_reset_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let response = UserService::verify_reset_token(&state, &token).await?;
    Ok(Json(response))
}

/// Current user's profile
///
/// GET /api/user/me
async fn me(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
) -> ApiResult<Json<UserProfileResponse>> {
    let profile = UserService::get_profile(&state, identity.id).await?;
    Ok(Json(profile))
}

/// Update bio, social links, and skills
///
/// PUT /api/user/profile
async fn update_profile(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserProfileResponse>> {
    let profile = UserService::update_profile(&state, identity.id, req).await?;
    Ok(Json(profile))
}
