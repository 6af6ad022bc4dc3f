//! JWT token generation and validation
//!
//! Provides access and refresh token management with pre-computed keys
//! for optimal performance.

use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use portfolio_shared::models::Role;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::Identity;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (identity ID)
    pub sub: String,
    /// Account email
    pub email: String,
    /// Display name
    pub name: String,
    /// Identity role
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Token ID; makes every issued token distinct even when two logins
    /// land in the same second, so a store overwrite always invalidates
    /// the earlier refresh token
    pub jti: String,
    /// Token type: "access" or "refresh"
    pub token_type: String,
}

impl Claims {
    /// Rebuild the verified identity carried in the claims
    pub fn identity(&self) -> Result<Identity> {
        let id = Uuid::parse_str(&self.sub)
            .map_err(|_| anyhow::anyhow!("Invalid subject in token"))?;
        Ok(Identity {
            id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
        })
    }
}

/// Pre-computed JWT keys for efficient token operations
/// These are expensive to create, so we cache them in AppState
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new JWT keys from secret
    /// This should be called once at startup
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// JWT service configuration
#[derive(Clone)]
pub struct JwtConfig {
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
}

/// JWT service for token operations
///
/// Design: Uses pre-computed keys to avoid expensive key derivation
/// on every request. Keys are wrapped in Arc for cheap cloning.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    config: JwtConfig,
}

impl JwtService {
    /// Create a new JWT service with pre-computed keys
    ///
    /// # Performance Note
    /// Call this once at application startup and store in AppState.
    /// Do NOT create per-request.
    pub fn new(secret: &str, access_token_expiry_secs: i64, refresh_token_expiry_secs: i64) -> Self {
        Self {
            keys: JwtKeys::new(secret),
            config: JwtConfig {
                access_token_expiry_secs,
                refresh_token_expiry_secs,
            },
        }
    }

    /// Create from pre-computed keys (for sharing across handlers)
    pub fn from_keys(keys: JwtKeys, config: JwtConfig) -> Self {
        Self { keys, config }
    }

    /// Generate an access token for an identity
    #[inline]
    pub fn generate_access_token(&self, identity: &Identity) -> Result<String> {
        self.generate_token(identity, "access", self.config.access_token_expiry_secs)
    }

    /// Generate a refresh token for an identity
    #[inline]
    pub fn generate_refresh_token(&self, identity: &Identity) -> Result<String> {
        self.generate_token(identity, "refresh", self.config.refresh_token_expiry_secs)
    }

    /// Generate the access/refresh pair issued on login
    pub fn generate_token_pair(&self, identity: &Identity) -> Result<(String, String)> {
        let access = self.generate_access_token(identity)?;
        let refresh = self.generate_refresh_token(identity)?;
        Ok((access, refresh))
    }

    /// Generate a token with specified type and expiry
    fn generate_token(&self, identity: &Identity, token_type: &str, expiry_secs: i64) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(expiry_secs);

        let claims = Claims {
            sub: identity.id.to_string(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            role: identity.role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: token_type.to_string(),
        };

        encode(&Header::default(), &claims, self.keys.encoding())
            .map_err(|e| anyhow::anyhow!("Failed to generate {} token: {}", token_type, e))
    }

    /// Validate a token and return claims
    #[inline]
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, self.keys.decoding(), &Validation::default())
            .map_err(|e| anyhow::anyhow!("Invalid token: {}", e))?;

        Ok(token_data.claims)
    }

    /// Validate an access token specifically
    #[inline]
    pub fn validate_access_token(&self, token: &str) -> Result<Claims> {
        let claims = self.validate_token(token)?;
        if claims.token_type != "access" {
            return Err(anyhow::anyhow!("Not an access token"));
        }
        Ok(claims)
    }

    /// Validate a refresh token specifically
    #[inline]
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims> {
        let claims = self.validate_token(token)?;
        if claims.token_type != "refresh" {
            return Err(anyhow::anyhow!("Not a refresh token"));
        }
        Ok(claims)
    }

    /// Get access token expiry in seconds
    #[inline]
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.config.access_token_expiry_secs
    }

    /// Get refresh token expiry in seconds
    #[inline]
    pub fn refresh_token_expiry_secs(&self) -> i64 {
        self.config.refresh_token_expiry_secs
    }

    /// Get the pre-computed keys (for sharing)
    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    /// Get the config (for sharing)
    pub fn jwt_config(&self) -> &JwtConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new("test-secret", 900, 604800)
    }

    fn test_identity(role: Role) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            name: "Someone".to_string(),
            role,
        }
    }

    #[test]
    fn test_generate_and_validate_access_token() {
        let service = create_test_service();
        let identity = test_identity(Role::Admin);

        let token = service.generate_access_token(&identity).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, identity.id.to_string());
        assert_eq!(claims.email, identity.email);
        assert_eq!(claims.name, identity.name);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_generate_and_validate_refresh_token() {
        let service = create_test_service();
        let identity = test_identity(Role::User);

        let token = service.generate_refresh_token(&identity).unwrap();
        let claims = service.validate_refresh_token(&token).unwrap();

        assert_eq!(claims.sub, identity.id.to_string());
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.token_type, "refresh");
    }

    #[test]
    fn test_token_lifetimes() {
        let service = create_test_service();
        let identity = test_identity(Role::User);

        let access = service.generate_access_token(&identity).unwrap();
        let refresh = service.generate_refresh_token(&identity).unwrap();

        let access_claims = service.validate_token(&access).unwrap();
        let refresh_claims = service.validate_token(&refresh).unwrap();

        assert_eq!(access_claims.exp - access_claims.iat, 900);
        assert_eq!(refresh_claims.exp - refresh_claims.iat, 604800);
    }

    #[test]
    fn test_token_pair_is_distinct() {
        let service = create_test_service();
        let identity = test_identity(Role::Admin);

        let (access, refresh) = service.generate_token_pair(&identity).unwrap();
        assert_ne!(access, refresh);
    }

    #[test]
    fn test_same_second_refresh_tokens_are_distinct() {
        let service = create_test_service();
        let identity = test_identity(Role::User);

        // Back-to-back issuance shares iat/exp at second granularity;
        // the jti claim must still make the tokens differ
        let first = service.generate_refresh_token(&identity).unwrap();
        let second = service.generate_refresh_token(&identity).unwrap();

        assert_ne!(first, second);

        let first_claims = service.validate_refresh_token(&first).unwrap();
        let second_claims = service.validate_refresh_token(&second).unwrap();
        assert_ne!(first_claims.jti, second_claims.jti);
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let service = create_test_service();
        let identity = test_identity(Role::User);

        let token = service.generate_access_token(&identity).unwrap();
        let result = service.validate_refresh_token(&token);

        assert!(result.is_err());
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let service = create_test_service();
        let identity = test_identity(Role::User);

        let token = service.generate_refresh_token(&identity).unwrap();
        let result = service.validate_access_token(&token);

        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_token_rejected() {
        let service = create_test_service();
        let result = service.validate_token("invalid.token.here");

        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = create_test_service();
        let identity = test_identity(Role::User);
        let now = Utc::now();

        let claims = Claims {
            sub: identity.id.to_string(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            role: identity.role,
            // Well past the default validation leeway
            exp: (now - Duration::hours(2)).timestamp(),
            iat: (now - Duration::hours(3)).timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: "access".to_string(),
        };
        let token = encode(&Header::default(), &claims, service.keys().encoding()).unwrap();

        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = create_test_service();
        let other = JwtService::new("other-secret", 900, 604800);
        let identity = test_identity(Role::Admin);

        let token = other.generate_access_token(&identity).unwrap();
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn test_claims_identity_round_trip() {
        let service = create_test_service();
        let identity = test_identity(Role::Admin);

        let token = service.generate_access_token(&identity).unwrap();
        let restored = service.validate_token(&token).unwrap().identity().unwrap();

        assert_eq!(restored.id, identity.id);
        assert_eq!(restored.email, identity.email);
        assert_eq!(restored.role, identity.role);
    }

    #[test]
    fn test_keys_can_be_shared() {
        let service = create_test_service();
        let keys = service.keys().clone();
        let config = service.jwt_config().clone();

        let service2 = JwtService::from_keys(keys, config);
        let identity = test_identity(Role::User);

        // Both services should produce valid tokens
        let token = service.generate_access_token(&identity).unwrap();
        let claims = service2.validate_access_token(&token).unwrap();
        assert_eq!(claims.sub, identity.id.to_string());
    }
}
