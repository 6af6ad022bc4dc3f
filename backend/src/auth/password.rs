//! Password hashing using bcrypt
//!
//! Provides secure password hashing and verification.
//!
//! # Performance Considerations
//!
//! Bcrypt is intentionally CPU-intensive. For high-throughput scenarios,
//! consider using `spawn_blocking` to avoid blocking the async runtime.

use anyhow::Result;
use bcrypt::{hash, verify, DEFAULT_COST};

/// Password hashing service
///
/// Bcrypt output is a fixed 60-character string, which the identity
/// repositories rely on for the stored hash columns.
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using bcrypt (blocking operation)
    ///
    /// # Performance Note
    /// This is CPU-intensive. For async contexts, use `hash_async`.
    pub fn hash(password: &str) -> Result<String> {
        hash(password, DEFAULT_COST).map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
    }

    /// Hash a password asynchronously (non-blocking)
    ///
    /// Spawns the CPU-intensive work on a blocking thread pool,
    /// preventing it from blocking the async runtime.
    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a hash (blocking operation)
    ///
    /// # Performance Note
    /// This is CPU-intensive. For async contexts, use `verify_async`.
    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        verify(password, hash).map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))
    }

    /// Verify a password asynchronously (non-blocking)
    ///
    /// Spawns the CPU-intensive work on a blocking thread pool.
    pub async fn verify_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }
}
