//! Portfolio Backend
//!
//! REST API for a personal portfolio site.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Services: Business logic
//! - Repositories: Data access
//! - Database: PostgreSQL with SQLx, Redis for the refresh-token store

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;
use portfolio_backend::auth::RefreshTokenStore;
use portfolio_backend::services::AdminService;
use portfolio_backend::{config, db, email, routes, state::AppState};
use redis::aio::ConnectionManager;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration; a missing JWT secret or missing admin
    // credentials abort the boot here
    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        "Starting Portfolio Backend"
    );

    // Create database pool
    info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database).await?;

    // Run migrations (skip in production if using separate migration job)
    if !config::AppConfig::is_production() {
        db::run_migrations(&db_pool).await?;
    }

    // Create or refresh the admin identity from the configured credentials
    let admin = AdminService::seed(&db_pool, &config).await?;
    info!(email = %admin.email, "Admin identity ready");

    // Refresh-token store: Redis when reachable, in-process otherwise
    let tokens = match connect_redis(&config.redis.url).await {
        Some(conn) => {
            RefreshTokenStore::redis(conn, config.jwt.refresh_token_expiry_secs as u64)
        }
        None => {
            warn!("Sessions will not survive restarts without Redis");
            RefreshTokenStore::in_memory(config.jwt.refresh_token_expiry_secs as u64)
        }
    };

    // Outbound mail: HTTP gateway when configured, log-only otherwise
    let mailer = email::build_mailer(&config.email)?;

    // Prometheus recorder backing the /metrics endpoint
    let metrics_handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Failed to install metrics recorder: {}. /metrics will be unavailable.", e);
            None
        }
    };

    // Create application state
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let mut state = AppState::new(db_pool, tokens, mailer, config);
    if let Some(handle) = metrics_handle {
        state = state.with_metrics(handle);
    }

    // Build application
    let app = routes::create_router(state);

    // Start server
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown; connect info feeds the login rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Connect to Redis with graceful fallback
///
/// Returns None if Redis is unavailable, allowing the app to run with the
/// in-process refresh-token store
async fn connect_redis(url: &str) -> Option<ConnectionManager> {
    info!("Connecting to Redis...");

    match redis::Client::open(url) {
        Ok(client) => match ConnectionManager::new(client).await {
            Ok(conn) => {
                info!("Redis connection established");
                Some(conn)
            }
            Err(e) => {
                warn!("Failed to connect to Redis: {}. Using the in-process token store.", e);
                None
            }
        },
        Err(e) => {
            warn!("Invalid Redis URL: {}. Using the in-process token store.", e);
            None
        }
    }
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "portfolio_backend=info,tower_http=info".into()
        } else {
            "portfolio_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
