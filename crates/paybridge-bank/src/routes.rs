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

use crate::handlers::{accounts, health, transactions};
use crate::state::AppState;

/// Maximum concurrent requests for the participant protocol endpoints.
/// Row locks serialize conflicting work anyway; this just bounds the queue.
const PROTOCOL_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Participant protocol (`x-api-key` auth)
/// - `POST /v1/transactions/prepare` - Prepare one leg
/// - `POST /v1/transactions/:id/commit` - Commit a prepared leg
/// - `POST /v1/transactions/:id/rollback` - Roll back a leg
/// - `POST /v1/accounts/balance` - Locked balance read
/// - `GET /v1/accounts` - Account listing
pub fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let state = Arc::new(state);

    let protocol_routes = Router::new()
        .route("/transactions/prepare", post(transactions::prepare))
        .route("/transactions/:id/commit", post(transactions::commit))
        .route("/transactions/:id/rollback", post(transactions::rollback))
        .route("/accounts/balance", post(accounts::balance))
        .route("/accounts", get(accounts::list_accounts))
        .layer(ConcurrencyLimitLayer::new(PROTOCOL_MAX_CONCURRENT_REQUESTS));

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", protocol_routes)
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}
