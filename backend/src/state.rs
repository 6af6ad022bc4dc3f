//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **Pre-compute expensive resources**: JWT keys and the DB pool are created once
//! 2. **Cheap cloning**: All fields use Arc or are already Clone-cheap
//! 3. **Injected collaborators**: the refresh-token store, mailer, and login
//!    rate limiter are owned here and handed to services; nothing hangs off
//!    module-level globals

use crate::auth::{JwtService, LoginRateLimiter, RefreshTokenStore};
use crate::config::AppConfig;
use crate::email::Mailer;
use metrics_exporter_prometheus::PrometheusHandle;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
///
/// This struct holds all shared resources that handlers need access to.
/// All fields are designed for cheap cloning across async tasks.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Pre-initialized JWT service with cached keys
    pub jwt: JwtService,
    /// Current-refresh-token store (Redis or in-process)
    pub tokens: RefreshTokenStore,
    /// Outbound mail dispatch
    pub mailer: Arc<dyn Mailer>,
    /// Sliding-window limiter guarding the login endpoints
    pub limiter: LoginRateLimiter,
    /// Prometheus render handle, absent when the recorder failed to install
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state
    ///
    /// Pre-computes the JWT keys from the config secret; keys are expensive
    /// to derive, so this should only be called once at application startup.
    pub fn new(
        db: PgPool,
        tokens: RefreshTokenStore,
        mailer: Arc<dyn Mailer>,
        config: AppConfig,
    ) -> Self {
        let jwt = JwtService::new(
            config.jwt.secret.expose_secret(),
            config.jwt.access_token_expiry_secs,
            config.jwt.refresh_token_expiry_secs,
        );

        Self {
            db,
            config: Arc::new(config),
            jwt,
            tokens,
            mailer,
            limiter: LoginRateLimiter::with_defaults(),
            metrics: None,
        }
    }

    /// Attach the Prometheus render handle for the metrics endpoint
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Get a reference to the database pool
    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the JWT service
    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Get a reference to the refresh-token store
    #[inline]
    pub fn tokens(&self) -> &RefreshTokenStore {
        &self.tokens
    }

    /// Get a reference to the mailer
    #[inline]
    pub fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }

    /// Get a reference to the login rate limiter
    #[inline]
    pub fn limiter(&self) -> &LoginRateLimiter {
        &self.limiter
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::Identity;
    use crate::test_support;
    use portfolio_shared::models::Role;

    #[tokio::test]
    async fn test_state_clone_is_cheap() {
        let state = test_support::state();

        // Clone should be O(1), just Arc increments
        let _cloned = state.clone();
    }

    #[tokio::test]
    async fn test_jwt_service_is_precomputed() {
        let state = test_support::state();

        let identity = Identity {
            id: uuid::Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            name: "Someone".to_string(),
            role: Role::User,
        };
        let token = state.jwt().generate_access_token(&identity).unwrap();
        assert!(!token.is_empty());
    }
}
