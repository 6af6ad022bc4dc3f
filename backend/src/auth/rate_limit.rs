//! Login rate limiting
//!
//! Best-effort sliding-window counter per client IP, applied to the login
//! endpoints only. State lives in process memory and resets on restart;
//! the reset/verification endpoints are deliberately not covered.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::warn;

const DEFAULT_MAX_ATTEMPTS: usize = 5;
const DEFAULT_WINDOW_SECS: i64 = 900;

// Stale-IP sweep threshold
const SWEEP_AT: usize = 10_000;

/// Sliding-window login attempt counter
#[derive(Clone)]
pub struct LoginRateLimiter {
    attempts: Arc<RwLock<HashMap<IpAddr, Vec<DateTime<Utc>>>>>,
    max_attempts: usize,
    window: Duration,
}

impl LoginRateLimiter {
    pub fn new(max_attempts: usize, window_secs: i64) -> Self {
        Self {
            attempts: Arc::new(RwLock::new(HashMap::new())),
            max_attempts,
            window: Duration::seconds(window_secs),
        }
    }

    /// 5 attempts per 15 minutes
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_SECS)
    }

    /// Record an attempt and report whether it is allowed
    pub async fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Utc::now()).await
    }

    async fn check_at(&self, ip: IpAddr, now: DateTime<Utc>) -> bool {
        let cutoff = now - self.window;
        let mut attempts = self.attempts.write().await;

        if attempts.len() > SWEEP_AT {
            attempts.retain(|_, stamps| stamps.iter().any(|t| *t > cutoff));
        }

        let stamps = attempts.entry(ip).or_default();
        stamps.retain(|t| *t > cutoff);

        if stamps.len() >= self.max_attempts {
            warn!(%ip, attempts = stamps.len(), "Login rate limit exceeded");
            return false;
        }

        stamps.push(now);
        true
    }
}

/// Best-effort client address: first X-Forwarded-For hop, then the socket peer
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> IpAddr {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| first.trim().parse().ok())
        .unwrap_or_else(|| {
            peer.map(|addr| addr.ip())
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
        })
}
