//! Authentication middleware
//!
//! Provides Axum extractors for JWT validation and identity extraction.
//!
//! A request with no bearer token at all is rejected with 401; a request
//! presenting a token that fails signature, expiry, or type checks gets
//! 403, and so does a verified identity with the wrong role.
//!
//! # Performance
//!
//! Uses pre-computed JWT keys from AppState to avoid expensive
//! key derivation on every request.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
};
use portfolio_shared::models::Role;

use super::Identity;

/// Cookie carrying the refresh token for the cookie-based route family
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Authenticated identity extracted from a bearer access token
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // No credentials at all: 401
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Invalid authorization format".to_string()))?;

        // A presented token that fails verification: 403
        let claims = app_state
            .jwt()
            .validate_access_token(token)
            .map_err(|_| ApiError::InvalidToken("Invalid or expired token".to_string()))?;

        let identity = claims
            .identity()
            .map_err(|_| ApiError::InvalidToken("Invalid or expired token".to_string()))?;

        Ok(AuthUser(identity))
    }
}

/// Verified identity that must carry the admin role
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Identity);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        if identity.role != Role::Admin {
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }
        Ok(RequireAdmin(identity))
    }
}

/// Verified identity that must carry the user role
#[derive(Debug, Clone)]
pub struct RequireUser(pub Identity);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for RequireUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        if identity.role != Role::User {
            return Err(ApiError::Forbidden("User access required".to_string()));
        }
        Ok(RequireUser(identity))
    }
}

/// Pull the refresh token out of the request's cookies, if present
pub fn refresh_token_from_cookies(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == REFRESH_COOKIE).then(|| value.to_string())
    })
}

/// Set-Cookie value installing the refresh token
pub fn refresh_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{REFRESH_COOKIE}={token}; HttpOnly; Path=/; Max-Age={max_age_secs}; SameSite=Strict"
    )
}

/// Set-Cookie value clearing the refresh token
pub fn clear_refresh_cookie() -> String {
    format!("{REFRESH_COOKIE}=; HttpOnly; Path=/; Max-Age=0; SameSite=Strict")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_refresh_token_from_single_cookie() {
        let headers = headers_with_cookie("refresh_token=abc123");
        assert_eq!(
            refresh_token_from_cookies(&headers),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_refresh_token_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; refresh_token=tok-42; lang=en");
        assert_eq!(
            refresh_token_from_cookies(&headers),
            Some("tok-42".to_string())
        );
    }

    #[test]
    fn test_missing_refresh_cookie() {
        let headers = headers_with_cookie("theme=dark; lang=en");
        assert_eq!(refresh_token_from_cookies(&headers), None);
        assert_eq!(refresh_token_from_cookies(&HeaderMap::new()), None);
    }

    #[test]
    fn test_refresh_cookie_format() {
        let cookie = refresh_cookie("tok", 604800);
        assert!(cookie.starts_with("refresh_token=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=604800"));

        let cleared = clear_refresh_cookie();
        assert!(cleared.contains("Max-Age=0"));
    }
}
