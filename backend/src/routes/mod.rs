//! Route definitions for the portfolio API
//!
//! This module organizes all API routes and applies middleware.

use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod admin;
mod blog;
mod comment;
mod contact;
mod health;
mod project;
mod testimonial;
mod user;

#[cfg(test)]
mod auth_tests;

pub use admin::admin_routes;
pub use blog::blog_routes;
pub use comment::comment_routes;
pub use contact::contact_routes;
pub use project::project_routes;
pub use testimonial::testimonial_routes;
pub use user::user_routes;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(metrics))
        .nest("/api", api_routes())
        // Apply middleware layers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/admin", admin::admin_routes())
        .nest("/user", user::user_routes())
        .nest("/blogs", blog::blog_routes())
        .nest("/projects", project::project_routes())
        .nest("/testimonials", testimonial::testimonial_routes())
        .nest("/contact", contact::contact_routes())
        .nest("/comments", comment::comment_routes())
}

/// CORS restricted to the configured frontend origin, falling back to
/// any origin when the configured value is not a valid header
fn cors_layer(state: &AppState) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match state.config().frontend.base_url.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => cors.allow_origin(Any),
    }
}

/// Prometheus metrics in text exposition format
///
/// GET /metrics
async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
