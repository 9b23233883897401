//! Transfer handlers: initiation and history.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use paybridge_core::{TransferRequest, TransferResponse};

use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::AppState;
use crate::transfers::TransferRecord;

/// One entry in the caller's transfer history.
#[derive(Debug, Serialize)]
pub struct TransferSummary {
    /// The transfer id.
    pub transfer_id: String,
    /// Account money left.
    pub source_account_number: String,
    /// The bank owning the source account.
    pub source_bank: String,
    /// Account money entered.
    pub destination_account_number: String,
    /// The bank owning the destination account.
    pub destination_bank: String,
    /// Amount in minor units.
    pub amount_cents: i64,
    /// Current (terminal, once finished) status.
    pub status: String,
    /// Outcome description, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<&TransferRecord> for TransferSummary {
    fn from(record: &TransferRecord) -> Self {
        Self {
            transfer_id: record.id.to_string(),
            source_account_number: record.source_account.to_string(),
            source_bank: record.source_bank.to_string(),
            destination_account_number: record.destination_account.to_string(),
            destination_bank: record.destination_bank.to_string(),
            amount_cents: record.amount.cents(),
            status: record.status.to_string(),
            message: record.message.clone(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

/// Transfer history response.
#[derive(Debug, Serialize)]
pub struct TransferHistoryResponse {
    /// Transfers touching the caller's accounts, newest first.
    pub transfers: Vec<TransferSummary>,
}

/// Execute a cross-bank transfer.
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(body): Json<TransferRequest>,
) -> Result<Json<TransferResponse>, ApiError> {
    let response = state.coordinator.transfer(&caller.id, &body).await?;
    Ok(Json(response))
}

/// The caller's transfer history.
pub async fn history(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Json<TransferHistoryResponse> {
    let transfers = state
        .coordinator
        .history(&caller.id)
        .iter()
        .map(TransferSummary::from)
        .collect();
    Json(TransferHistoryResponse { transfers })
}
