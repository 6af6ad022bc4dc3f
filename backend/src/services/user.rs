//! User account service
//!
//! Signup, email verification, login, password reset, and profile
//! management. Reset and verification tokens follow the same single-use
//! tagged-state rules; responses to the email-keyed endpoints never
//! reveal whether an address is registered.

use crate::auth::{Identity, PasswordService};
use crate::email::{password_changed_message, password_reset_message, verification_message};
use crate::error::ApiError;
use crate::repositories::{UpdateUserProfile, UserRecord, UserRepository};
use crate::services::auth::{generate_secure_token, SessionService, RESET_REQUESTED_MESSAGE};
use crate::state::AppState;
use chrono::{Duration, Utc};
use metrics::counter;
use portfolio_shared::models::Role;
use portfolio_shared::types::{
    LoginRequest, LoginResponse, MessageResponse, SignupRequest, UpdateProfileRequest,
    UserProfileResponse,
};
use portfolio_shared::validation;
use sqlx::types::Json;
use std::net::IpAddr;
use tracing::warn;
use uuid::Uuid;
use validator::ValidateEmail;

const RESET_TOKEN_TTL_HOURS: i64 = 1;
const VERIFICATION_TOKEN_TTL_HOURS: i64 = 24;

const VERIFICATION_SENT_MESSAGE: &str =
    "If that email is registered, a verification link has been sent";

/// User service for account and authentication operations
pub struct UserService;

impl UserService {
    /// Register a new account and send the verification link
    ///
    /// The account exists immediately but cannot log in until the email
    /// is verified. A failed verification send is logged and swallowed;
    /// resend-verification recovers from it.
    pub async fn signup(state: &AppState, request: &SignupRequest) -> Result<MessageResponse, ApiError> {
        validate_field("name", validation::validate_name(&request.name))?;
        if !request.email.validate_email() {
            return Err(ApiError::FieldValidation {
                field: "email".to_string(),
                message: "Invalid email format".to_string(),
            });
        }
        validate_field("password", validation::validate_password(&request.password))?;

        if UserRepository::email_exists(state.db(), &request.email).await? {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let password_hash = PasswordService::hash_async(request.password.clone()).await?;

        let token = generate_secure_token();
        let expires_at = Utc::now() + Duration::hours(VERIFICATION_TOKEN_TTL_HOURS);
        let user = UserRepository::create(
            state.db(),
            &request.email,
            request.name.trim(),
            &password_hash,
            &token,
            expires_at,
        )
        .await?;

        counter!("auth_signups_total").increment(1);

        let message =
            verification_message(&state.config().frontend.base_url, &user.email, &token);
        if let Err(err) = state.mailer().send(&message).await {
            warn!(error = %err, "verification email dispatch failed");
        }

        Ok(MessageResponse::new(
            "Account created. Check your email to verify your address",
        ))
    }

    /// Consume a verification token and activate login
    pub async fn verify_email(state: &AppState, token: &str) -> Result<MessageResponse, ApiError> {
        let user = UserRepository::find_by_verification_token(state.db(), token)
            .await?
            .ok_or_else(invalid_verification_token)?;

        if !user.verification_token_state().matches(token, Utc::now()) {
            return Err(invalid_verification_token());
        }

        UserRepository::mark_verified(state.db(), user.id).await?;

        counter!("auth_verifications_total").increment(1);

        Ok(MessageResponse::new("Email verified, you can now log in"))
    }

    /// Issue a fresh verification token
    ///
    /// Unknown and already-verified emails get the same reply.
    pub async fn resend_verification(
        state: &AppState,
        email: &str,
    ) -> Result<MessageResponse, ApiError> {
        if email.trim().is_empty() {
            return Err(ApiError::Validation("Email is required".to_string()));
        }

        let Some(user) = UserRepository::find_by_email(state.db(), email)
            .await?
            .filter(|record| record.active && !record.email_verified)
        else {
            return Ok(MessageResponse::new(VERIFICATION_SENT_MESSAGE));
        };

        let token = generate_secure_token();
        let expires_at = Utc::now() + Duration::hours(VERIFICATION_TOKEN_TTL_HOURS);
        UserRepository::set_verification_token(state.db(), user.id, &token, expires_at).await?;

        let message =
            verification_message(&state.config().frontend.base_url, &user.email, &token);
        if let Err(err) = state.mailer().send(&message).await {
            warn!(error = %err, "verification email dispatch failed");
        }

        Ok(MessageResponse::new(VERIFICATION_SENT_MESSAGE))
    }

    /// Authenticate a verified user and open a session
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

        counter!("auth_login_attempts_total", "role" => "user").increment(1);

        let user = UserRepository::find_by_email(state.db(), &request.email)
            .await?
            .filter(|record| record.active)
            .ok_or_else(invalid_credentials)?;

        let valid = PasswordService::verify_async(
            request.password.clone(),
            user.password_hash.clone(),
        )
        .await?;
        if !valid {
            counter!("auth_login_failures_total", "role" => "user").increment(1);
            return Err(invalid_credentials());
        }

        if !user.email_verified {
            return Err(ApiError::Forbidden("Account not available".to_string()));
        }

        UserRepository::touch_last_login(state.db(), user.id).await?;

        let identity = Identity {
            id: user.id,
            email: user.email,
            name: user.name,
            role: Role::User,
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
    pub async fn forgot_password(state: &AppState, email: &str) -> Result<MessageResponse, ApiError> {
        if email.trim().is_empty() {
            return Err(ApiError::Validation("Email is required".to_string()));
        }

        let Some(user) = UserRepository::find_by_email(state.db(), email)
            .await?
            .filter(|record| record.active)
        else {
            return Ok(MessageResponse::new(RESET_REQUESTED_MESSAGE));
        };

        let token = generate_secure_token();
        let expires_at = Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS);
        UserRepository::set_reset_token(state.db(), user.id, &token, expires_at).await?;

        let message = password_reset_message(
            &state.config().frontend.base_url,
            Role::User,
            &user.email,
            &token,
        );
        if let Err(err) = state.mailer().send(&message).await {
            UserRepository::clear_reset_token(state.db(), user.id).await?;
            warn!(error = %err, "reset email dispatch failed, token rolled back");
            return Err(ApiError::Internal(err.context("failed to send reset email")));
        }

        counter!("auth_reset_requests_total", "role" => "user").increment(1);

        Ok(MessageResponse::new(RESET_REQUESTED_MESSAGE))
    }

    /// Check a reset token without consuming it
    pub async fn verify_reset_token(state: &AppState, token: &str) -> Result<MessageResponse, ApiError> {
        let user = UserRepository::find_by_reset_token(state.db(), token)
            .await?
            .ok_or_else(invalid_reset_token)?;

        if !user.reset_token_state().matches(token, Utc::now()) {
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
        validate_field("password", validation::validate_password(password))?;

        let user = UserRepository::find_by_reset_token(state.db(), token)
            .await?
            .ok_or_else(invalid_reset_token)?;

        if !user.reset_token_state().matches(token, Utc::now()) {
            return Err(invalid_reset_token());
        }

        let hash = PasswordService::hash_async(password.to_string()).await?;
        UserRepository::update_password_hash(state.db(), user.id, &hash).await?;
        UserRepository::clear_reset_token(state.db(), user.id).await?;

        // A password change ends the current session
        state.tokens().revoke(Role::User, user.id).await?;

        counter!("auth_resets_completed_total", "role" => "user").increment(1);

        let confirmation = password_changed_message(&user.email);
        if let Err(err) = state.mailer().send(&confirmation).await {
            warn!(error = %err, "password-changed confirmation email failed");
        }

        Ok(MessageResponse::new("Password has been reset"))
    }

    /// Fetch the authenticated user's profile
    pub async fn get_profile(state: &AppState, user_id: Uuid) -> Result<UserProfileResponse, ApiError> {
        let user = UserRepository::find_by_id(state.db(), user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(profile_from(user))
    }

    /// Update profile fields
    pub async fn update_profile(
        state: &AppState,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<UserProfileResponse, ApiError> {
        if let Some(name) = &request.name {
            validate_field("name", validation::validate_name(name))?;
        }
        if let Some(bio) = &request.bio {
            validate_field("bio", validation::validate_message_body(bio))?;
        }
        if let Some(links) = &request.social_links {
            for link in [&links.github, &links.linkedin, &links.twitter, &links.website]
                .into_iter()
                .flatten()
            {
                validate_field("socialLinks", validation::validate_link(link))?;
            }
        }
        if let Some(skills) = &request.skills {
            if skills.iter().any(|skill| skill.trim().is_empty()) {
                return Err(ApiError::FieldValidation {
                    field: "skills".to_string(),
                    message: "Skills cannot be empty".to_string(),
                });
            }
        }

        let updates = UpdateUserProfile {
            name: request.name,
            bio: request.bio,
            social_links: request.social_links.map(Json),
            skills: request.skills,
        };

        let user = UserRepository::update_profile(state.db(), user_id, updates)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(profile_from(user))
    }
}

fn profile_from(record: UserRecord) -> UserProfileResponse {
    UserProfileResponse {
        id: record.id.to_string(),
        email: record.email,
        name: record.name,
        role: Role::User,
        bio: record.bio,
        social_links: record.social_links.0,
        skills: record.skills,
        liked_blogs: record.liked_blogs.iter().map(Uuid::to_string).collect(),
        bookmarked_projects: record
            .bookmarked_projects
            .iter()
            .map(Uuid::to_string)
            .collect(),
        email_verified: record.email_verified,
        last_login_at: record.last_login_at,
        created_at: record.created_at,
    }
}

fn validate_field(field: &str, result: Result<(), String>) -> Result<(), ApiError> {
    result.map_err(|message| ApiError::FieldValidation {
        field: field.to_string(),
        message,
    })
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".to_string())
}

fn invalid_reset_token() -> ApiError {
    ApiError::BadRequest("Invalid or expired reset token".to_string())
}

fn invalid_verification_token() -> ApiError {
    ApiError::BadRequest("Invalid or expired verification link".to_string())
}

#[cfg(test)]
mod tests {
    // Integration tests require database - marked with #[ignore]
}
