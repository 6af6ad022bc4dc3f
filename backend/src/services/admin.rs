//! Admin account service
//!
//! The admin identity is a real database record seeded from configuration
//! at startup; login only ever verifies the stored bcrypt hash. Password
//! reset follows the same token flow as user accounts.

use crate::auth::{Identity, PasswordService};
use crate::config::AppConfig;
use crate::email::{password_changed_message, password_reset_message};
use crate::error::ApiError;
use crate::repositories::{AdminRecord, AdminRepository};
use crate::services::auth::{generate_secure_token, SessionService, RESET_REQUESTED_MESSAGE};
use crate::state::AppState;
use chrono::{Duration, Utc};
use metrics::counter;
use portfolio_shared::models::Role;
use portfolio_shared::types::{LoginRequest, LoginResponse, MessageResponse};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use std::net::IpAddr;
use tracing::{info, warn};

const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// Admin service for identity bootstrap and authentication
pub struct AdminService;

impl AdminService {
    /// Seed the admin identity from configuration
    ///
    /// Creates the row on first boot. When the configured password no longer
    /// matches the stored hash, the hash is replaced, so rotating
    /// ADMIN_LOGIN_PASSWORD takes effect on restart. Any admin row under a
    /// different email is deactivated.
    pub async fn seed(pool: &PgPool, config: &AppConfig) -> anyhow::Result<AdminRecord> {
        let email = config.auth.admin_email.as_str();
        let password = config.auth.admin_password.expose_secret();

        let admin = match AdminRepository::find_by_email(pool, email).await? {
            Some(existing) => {
                let still_valid = PasswordService::verify_async(
                    password.to_string(),
                    existing.password_hash.clone(),
                )
                .await
                .unwrap_or(false);

                if !still_valid {
                    let hash = PasswordService::hash_async(password.to_string()).await?;
                    AdminRepository::update_password_hash(pool, existing.id, &hash).await?;
                    info!(admin_id = %existing.id, "admin password hash refreshed from configuration");
                }
                existing
            }
            None => {
                let hash = PasswordService::hash_async(password.to_string()).await?;
                let created = AdminRepository::upsert(pool, email, "Admin", &hash).await?;
                info!(admin_id = %created.id, "admin identity created");
                created
            }
        };

        let deactivated = AdminRepository::deactivate_others(pool, email).await?;
        if deactivated > 0 {
            warn!(count = deactivated, "deactivated admin rows no longer matching configuration");
        }

        Ok(admin)
    }

    /// Authenticate the admin and open a session
    pub async fn login(
        state: &AppState,
        ip: IpAddr,
        request: &LoginRequest,
    ) -> Result<LoginResponse, ApiError> {
        if !state.limiter().check(ip).await {
            counter!("auth_rate_limited_total").increment(1);
            return Err(ApiError::TooManyRequests(
                "Too many login attempts, try again later".to_string(),
            ));
        }

        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(ApiError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        counter!("auth_login_attempts_total", "role" => "admin").increment(1);

        let admin = AdminRepository::find_by_email(state.db(), &request.email)
            .await?
            .filter(|record| record.active)
            .ok_or_else(invalid_credentials)?;

        let valid = PasswordService::verify_async(
            request.password.clone(),
            admin.password_hash.clone(),
        )
        .await?;
        if !valid {
            counter!("auth_login_failures_total", "role" => "admin").increment(1);
            return Err(invalid_credentials());
        }

        AdminRepository::touch_last_login(state.db(), admin.id).await?;

        let identity = Identity {
            id: admin.id,
            email: admin.email,
            name: admin.name,
            role: Role::Admin,
        };
        let (token, refresh_token) = SessionService::issue(state, &identity).await?;

        Ok(LoginResponse {
            message: "Login successful".to_string(),
            user: identity.info(),
            token,
            refresh_token,
        })
    }

    /// Issue a reset token and email the reset link
    ///
    /// Unknown emails get the same reply with no token issued. A failed
    /// dispatch rolls the freshly stored token back so no live token
    /// exists that was never delivered.
    pub async fn forgot_password(state: &AppState, email: &str) -> Result<MessageResponse, ApiError> {
        if email.trim().is_empty() {
            return Err(ApiError::Validation("Email is required".to_string()));
        }

        let Some(admin) = AdminRepository::find_by_email(state.db(), email)
            .await?
            .filter(|record| record.active)
        else {
            return Ok(MessageResponse::new(RESET_REQUESTED_MESSAGE));
        };

        let token = generate_secure_token();
        let expires_at = Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS);
        AdminRepository::set_reset_token(state.db(), admin.id, &token, expires_at).await?;

        let message = password_reset_message(
            &state.config().frontend.base_url,
            Role::Admin,
            &admin.email,
            &token,
        );
        if let Err(err) = state.mailer().send(&message).await {
            AdminRepository::clear_reset_token(state.db(), admin.id).await?;
            warn!(error = %err, "reset email dispatch failed, token rolled back");
            return Err(ApiError::Internal(err.context("failed to send reset email")));
        }

        counter!("auth_reset_requests_total", "role" => "admin").increment(1);

        Ok(MessageResponse::new(RESET_REQUESTED_MESSAGE))
    }

    /// Check a reset token without consuming it
    pub async fn verify_reset_token(state: &AppState, token: &str) -> Result<MessageResponse, ApiError> {
        let admin = AdminRepository::find_by_reset_token(state.db(), token)
            .await?
            .ok_or_else(invalid_reset_token)?;

        if !admin.reset_token_state().matches(token, Utc::now()) {
            return Err(invalid_reset_token());
        }

        Ok(MessageResponse::new("Reset token is valid"))
    }

    /// Consume a reset token and store the new password
    pub async fn reset_password(
        state: &AppState,
        token: &str,
        password: &str,
    ) -> Result<MessageResponse, ApiError> {
        if let Err(reason) = portfolio_shared::validation::validate_password(password) {
            return Err(ApiError::FieldValidation {
                field: "password".to_string(),
                message: reason,
            });
        }

        let admin = AdminRepository::find_by_reset_token(state.db(), token)
            .await?
            .ok_or_else(invalid_reset_token)?;

        if !admin.reset_token_state().matches(token, Utc::now()) {
            return Err(invalid_reset_token());
        }

        let hash = PasswordService::hash_async(password.to_string()).await?;
        AdminRepository::update_password_hash(state.db(), admin.id, &hash).await?;
        AdminRepository::clear_reset_token(state.db(), admin.id).await?;

        // A password change ends the current session
        state.tokens().revoke(Role::Admin, admin.id).await?;

        counter!("auth_resets_completed_total", "role" => "admin").increment(1);

        // Confirmation is best effort; the password change stands either way
        let confirmation = password_changed_message(&admin.email);
        if let Err(err) = state.mailer().send(&confirmation).await {
            warn!(error = %err, "password-changed confirmation email failed");
        }

        Ok(MessageResponse::new("Password has been reset"))
    }
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".to_string())
}

fn invalid_reset_token() -> ApiError {
    ApiError::BadRequest("Invalid or expired reset token".to_string())
}
