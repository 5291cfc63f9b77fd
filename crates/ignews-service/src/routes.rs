//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, webhooks};
use crate::state::AppState;

/// Path of the Stripe webhook endpoint.
pub const WEBHOOK_PATH: &str = "/api/webhooks";

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// - `GET /health` - Health check
/// - `POST /api/webhooks` - Stripe webhooks (signature verification);
///   any other method answers 405 with `Allow: POST`
pub fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let state = Arc::new(state);

    Router::new()
        .route("/health", get(health::health))
        .route(
            WEBHOOK_PATH,
            post(webhooks::stripe_webhook).fallback(webhooks::method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        // The `Bytes` extractor otherwise caps bodies at axum's 2 MiB default.
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}
