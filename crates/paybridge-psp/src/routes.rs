//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{accounts, health, transfers};
use crate::state::AppState;

/// Maximum concurrent transfer requests. Each transfer holds a worker for
/// up to two phase deadlines plus the balance refresh; bounding concurrency
/// keeps a flood of stuck transfers from exhausting the service.
const TRANSFER_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Coordinator surface (`x-caller-id` identity)
/// - `POST /v1/transfers` - Execute a cross-bank transfer
/// - `GET /v1/transfers` - Transfer history over the caller's accounts
/// - `GET /v1/accounts` - The caller's mirrored accounts
pub fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let state = Arc::new(state);

    let api_routes = Router::new()
        .route(
            "/transfers",
            post(transfers::create_transfer).get(transfers::history),
        )
        .route("/accounts", get(accounts::list_accounts))
        .layer(ConcurrencyLimitLayer::new(TRANSFER_MAX_CONCURRENT_REQUESTS));

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}
