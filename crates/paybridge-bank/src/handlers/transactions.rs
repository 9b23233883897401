//! Participant protocol handlers: prepare, commit, rollback.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use paybridge_core::{LegId, LegResponse, PrepareRequest};

use crate::auth::ApiKey;
use crate::error::ApiError;
use crate::state::AppState;

/// Prepare one leg of a transfer.
pub async fn prepare(
    State(state): State<Arc<AppState>>,
    _auth: ApiKey,
    Json(body): Json<PrepareRequest>,
) -> Result<Json<LegResponse>, ApiError> {
    state.teller.prepare(&body).await.map(Json)
}

/// Commit a prepared leg.
pub async fn commit(
    State(state): State<Arc<AppState>>,
    _auth: ApiKey,
    Path(transaction_id): Path<LegId>,
) -> Result<Json<LegResponse>, ApiError> {
    state.teller.commit(transaction_id).await.map(Json)
}

/// Roll back a leg.
pub async fn rollback(
    State(state): State<Arc<AppState>>,
    _auth: ApiKey,
    Path(transaction_id): Path<LegId>,
) -> Result<Json<LegResponse>, ApiError> {
    state.teller.rollback(transaction_id).await.map(Json)
}
