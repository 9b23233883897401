//! Mirrored-account handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::auth::Caller;
use crate::state::AppState;

/// One mirrored account in the caller's listing.
#[derive(Debug, Serialize)]
pub struct MirroredAccount {
    /// The account number.
    pub account_number: String,
    /// The bank that owns the account.
    pub bank: String,
    /// Cached balance in minor units; refreshed after successful transfers,
    /// never authoritative.
    pub balance_cents: i64,
}

/// Mirrored-account listing response.
#[derive(Debug, Serialize)]
pub struct ListMirroredAccountsResponse {
    /// The caller's accounts.
    pub accounts: Vec<MirroredAccount>,
}

/// List the caller's mirrored accounts.
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Json<ListMirroredAccountsResponse> {
    let accounts = state
        .coordinator
        .accounts(&caller.id)
        .await
        .into_iter()
        .map(|(number, bank, balance)| MirroredAccount {
            account_number: number.to_string(),
            bank: bank.to_string(),
            balance_cents: balance.cents(),
        })
        .collect();

    Json(ListMirroredAccountsResponse { accounts })
}
