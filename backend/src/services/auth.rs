//! Session service: token issuance, refresh, and revocation
//!
//! Both login families go through here so the refresh-store bookkeeping
//! and counters stay in one place. A refresh call hands out a new access
//! token only; the refresh token keeps its login-issued lifetime and is
//! replaced when the identity logs in again.

use crate::auth::Identity;
use crate::error::ApiError;
use crate::repositories::{AdminRepository, UserRepository};
use crate::state::AppState;
use metrics::counter;
use portfolio_shared::models::Role;
use portfolio_shared::types::{MessageResponse, RefreshResponse};
use rand::rngs::OsRng;
use rand::RngCore;

/// Generic reply for both known and unknown reset emails
pub const RESET_REQUESTED_MESSAGE: &str =
    "If that email is registered, a reset link has been sent";

/// Random single-use token, 32 bytes of OS entropy as hex
pub fn generate_secure_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Session service for token lifecycle operations
pub struct SessionService;

impl SessionService {
    /// Mint an access/refresh pair and record the refresh token as the
    /// identity's current one. A prior session's refresh token is
    /// overwritten here, which is what invalidates it.
    pub async fn issue(
        state: &AppState,
        identity: &Identity,
    ) -> Result<(String, String), ApiError> {
        let (access_token, refresh_token) = state.jwt().generate_token_pair(identity)?;

        state
            .tokens()
            .put(identity.role, identity.id, &refresh_token)
            .await?;

        counter!("auth_logins_total", "role" => identity.role.as_str()).increment(1);

        Ok((access_token, refresh_token))
    }

    /// Exchange a refresh token for a new access token
    ///
    /// The presented token must verify as a refresh token, carry the role
    /// the route family expects, and equal the identity's current stored
    /// token. A cryptographically valid token from before a newer login
    /// fails the last check.
    pub async fn refresh(
        state: &AppState,
        expected_role: Role,
        refresh_token: &str,
    ) -> Result<RefreshResponse, ApiError> {
        let claims = state
            .jwt()
            .validate_refresh_token(refresh_token)
            .map_err(|_| {
                counter!("auth_refresh_rejections_total", "role" => expected_role.as_str())
                    .increment(1);
                ApiError::InvalidToken("Invalid or expired token".to_string())
            })?;

        let identity = claims
            .identity()
            .map_err(|_| ApiError::InvalidToken("Invalid or expired token".to_string()))?;

        if identity.role != expected_role {
            return Err(ApiError::Forbidden("Access denied".to_string()));
        }

        let current = state
            .tokens()
            .is_current(identity.role, identity.id, refresh_token)
            .await?;
        if !current {
            counter!("auth_refresh_rejections_total", "role" => expected_role.as_str())
                .increment(1);
            return Err(ApiError::InvalidToken("Invalid or expired token".to_string()));
        }

        Self::ensure_identity_active(state, &identity).await?;

        let access_token = state.jwt().generate_access_token(&identity)?;

        counter!("auth_refreshes_total", "role" => expected_role.as_str()).increment(1);

        Ok(RefreshResponse {
            message: "Token refreshed".to_string(),
            token: access_token,
        })
    }

    /// Drop the identity's current refresh token
    pub async fn logout(state: &AppState, identity: &Identity) -> Result<MessageResponse, ApiError> {
        state.tokens().revoke(identity.role, identity.id).await?;

        counter!("auth_logouts_total", "role" => identity.role.as_str()).increment(1);

        Ok(MessageResponse::new("Logged out"))
    }

    /// The identity behind a refresh token must still be a live account
    async fn ensure_identity_active(state: &AppState, identity: &Identity) -> Result<(), ApiError> {
        let active = match identity.role {
            Role::Admin => AdminRepository::find_by_id(state.db(), identity.id)
                .await?
                .map(|admin| admin.active)
                .unwrap_or(false),
            Role::User => UserRepository::find_by_id(state.db(), identity.id)
                .await?
                .map(|user| user.active && user.email_verified)
                .unwrap_or(false),
        };

        if !active {
            return Err(ApiError::InvalidToken("Invalid or expired token".to_string()));
        }

        Ok(())
    }
}
