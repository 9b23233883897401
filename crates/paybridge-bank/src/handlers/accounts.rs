//! Account handlers: balance reads and the operator listing.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use paybridge_core::{BalanceRequest, BalanceResponse, ListAccountsResponse};

use crate::auth::ApiKey;
use crate::error::ApiError;
use crate::state::AppState;

/// Locked read of one account's balance. The account number arrives
/// encrypted, so this is a POST with a body rather than a path parameter.
pub async fn balance(
    State(state): State<Arc<AppState>>,
    _auth: ApiKey,
    Json(body): Json<BalanceRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    state.teller.balance(&body).await.map(Json)
}

/// List this bank's accounts with current balances.
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    _auth: ApiKey,
) -> Json<ListAccountsResponse> {
    Json(state.teller.list_accounts().await)
}
