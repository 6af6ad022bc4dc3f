//! Authentication and session management
//!
//! Covers credential checks, token issuance and verification, the
//! refresh-token store, and login rate limiting.

mod jwt;
mod middleware;
mod password;
mod rate_limit;
mod store;

pub use jwt::{Claims, JwtKeys, JwtService};
pub use middleware::{
    clear_refresh_cookie, refresh_cookie, refresh_token_from_cookies, AuthUser, RequireAdmin,
    RequireUser, REFRESH_COOKIE,
};
pub use password::PasswordService;
pub use rate_limit::{client_ip, LoginRateLimiter};
pub use store::RefreshTokenStore;

use portfolio_shared::models::Role;
use portfolio_shared::types::IdentityInfo;
use uuid::Uuid;

/// A verified identity, either the seeded admin or a registered user
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl Identity {
    pub fn info(&self) -> IdentityInfo {
        IdentityInfo {
            id: self.id.to_string(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}
