//! Refresh-token store
//!
//! Holds the single currently-valid refresh token per identity: a new login
//! overwrites the previous entry (last write wins) and logout revokes it.
//! A presented refresh token must match the stored one, not merely carry a
//! valid signature, which is what rejects replays of pre-overwrite tokens.
//!
//! Backed by Redis when available so sessions survive restarts and are
//! shared across instances; falls back to an in-process map for
//! single-instance deployments. The store is injected through `AppState`,
//! never reached through a module global.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use portfolio_shared::models::Role;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Store for the current refresh token of each identity
#[derive(Clone)]
pub struct RefreshTokenStore {
    backend: Backend,
    ttl_secs: u64,
}

#[derive(Clone)]
enum Backend {
    Redis(ConnectionManager),
    Memory(Arc<RwLock<HashMap<String, String>>>),
}

impl RefreshTokenStore {
    /// Redis-backed store; entries expire with the refresh-token lifetime
    pub fn redis(conn: ConnectionManager, ttl_secs: u64) -> Self {
        Self {
            backend: Backend::Redis(conn),
            ttl_secs,
        }
    }

    /// In-process store for deployments without Redis. Entries are lost on
    /// restart, which invalidates all outstanding refresh tokens. Stale
    /// entries need no expiry sweep: the token's own `exp` claim is checked
    /// before the store is ever consulted.
    pub fn in_memory(ttl_secs: u64) -> Self {
        Self {
            backend: Backend::Memory(Arc::new(RwLock::new(HashMap::new()))),
            ttl_secs,
        }
    }

    /// True when sessions are shared across instances
    pub fn is_shared(&self) -> bool {
        matches!(self.backend, Backend::Redis(_))
    }

    fn key(role: Role, id: Uuid) -> String {
        format!("refresh:{}:{}", role, id)
    }

    /// Record `token` as the identity's current refresh token,
    /// replacing any previous one
    pub async fn put(&self, role: Role, id: Uuid, token: &str) -> Result<()> {
        let key = Self::key(role, id);
        match &self.backend {
            Backend::Redis(conn) => {
                let mut conn = conn.clone();
                let _: () = conn.set_ex(&key, token, self.ttl_secs).await?;
            }
            Backend::Memory(map) => {
                map.write().await.insert(key, token.to_string());
            }
        }
        debug!(role = %role, %id, "Stored refresh token");
        Ok(())
    }

    /// Fetch the identity's current refresh token, if any
    pub async fn get(&self, role: Role, id: Uuid) -> Result<Option<String>> {
        let key = Self::key(role, id);
        match &self.backend {
            Backend::Redis(conn) => {
                let mut conn = conn.clone();
                Ok(conn.get(&key).await?)
            }
            Backend::Memory(map) => Ok(map.read().await.get(&key).cloned()),
        }
    }

    /// Drop the identity's refresh token (logout)
    pub async fn revoke(&self, role: Role, id: Uuid) -> Result<()> {
        let key = Self::key(role, id);
        match &self.backend {
            Backend::Redis(conn) => {
                let mut conn = conn.clone();
                let _: () = conn.del(&key).await?;
            }
            Backend::Memory(map) => {
                map.write().await.remove(&key);
            }
        }
        debug!(role = %role, %id, "Revoked refresh token");
        Ok(())
    }

    /// Verify the backing store is reachable
    pub async fn health_check(&self) -> Result<()> {
        match &self.backend {
            Backend::Redis(conn) => {
                let mut conn = conn.clone();
                let _: String = redis::cmd("PING").query_async(&mut conn).await?;
                Ok(())
            }
            Backend::Memory(_) => Ok(()),
        }
    }

    /// True when `token` equals the identity's stored current token
    pub async fn is_current(&self, role: Role, id: Uuid, token: &str) -> Result<bool> {
        Ok(self
            .get(role, id)
            .await?
            .map(|stored| stored == token)
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RefreshTokenStore {
        RefreshTokenStore::in_memory(604800)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = store();
        let id = Uuid::new_v4();

        assert_eq!(store.get(Role::User, id).await.unwrap(), None);
        store.put(Role::User, id, "token-1").await.unwrap();
        assert_eq!(
            store.get(Role::User, id).await.unwrap(),
            Some("token-1".to_string())
        );
    }

    #[tokio::test]
    async fn test_second_login_overwrites() {
        let store = store();
        let id = Uuid::new_v4();

        store.put(Role::Admin, id, "first").await.unwrap();
        store.put(Role::Admin, id, "second").await.unwrap();

        assert!(store.is_current(Role::Admin, id, "second").await.unwrap());
        assert!(!store.is_current(Role::Admin, id, "first").await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_clears_entry() {
        let store = store();
        let id = Uuid::new_v4();

        store.put(Role::User, id, "token").await.unwrap();
        store.revoke(Role::User, id).await.unwrap();

        assert_eq!(store.get(Role::User, id).await.unwrap(), None);
        assert!(!store.is_current(Role::User, id, "token").await.unwrap());
    }

    #[tokio::test]
    async fn test_roles_are_isolated() {
        let store = store();
        let id = Uuid::new_v4();

        store.put(Role::Admin, id, "admin-token").await.unwrap();
        store.put(Role::User, id, "user-token").await.unwrap();

        assert!(store.is_current(Role::Admin, id, "admin-token").await.unwrap());
        assert!(store.is_current(Role::User, id, "user-token").await.unwrap());
        assert!(!store.is_current(Role::User, id, "admin-token").await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_store_is_not_shared() {
        assert!(!store().is_shared());
    }
}
