//! Transfer and API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use paybridge_core::{ApiErrorBody, ApiErrorEnvelope, ErrorCode, TransferId, TransferStatus};

/// Errors the transfer coordinator reports to its callers.
///
/// Variants that occur after the transfer record exists carry the transfer
/// id and the terminal status the record was left in, so every rejection is
/// auditable against the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    /// The request is malformed (same account, zero amount, ...); rejected
    /// before a record was created.
    #[error("{0}")]
    Validation(String),

    /// An account in the request is unknown to the PSP (or not owned by the
    /// caller); rejected before a record was created.
    #[error("{0}")]
    NotFound(String),

    /// The local pre-check found the mirrored source balance short. The
    /// bank stays authoritative, but there is no point contacting it.
    #[error("insufficient funds: balance={balance}, required={required}")]
    InsufficientFunds {
        /// The failed transfer's id (record left `FAILED`).
        transfer_id: TransferId,
        /// Mirrored balance in minor units.
        balance: i64,
        /// Required amount in minor units.
        required: i64,
    },

    /// A bank adapter could not be resolved; nothing was sent.
    #[error("bank unavailable: {message}")]
    RemoteUnavailable {
        /// The failed transfer's id (record left `FAILED`).
        transfer_id: TransferId,
        /// What could not be resolved.
        message: String,
    },

    /// A phase failed and compensation completed: both ledgers are back to
    /// their pre-transfer state.
    #[error("transfer rolled back: {cause}")]
    RolledBack {
        /// The transfer's id (record left `ROLLED_BACK`).
        transfer_id: TransferId,
        /// The taxonomy code of the original failure being propagated.
        code: ErrorCode,
        /// The original failure.
        cause: String,
    },

    /// A phase failed and compensation itself failed: money may be
    /// inconsistent across the two ledgers. Requires operator attention.
    #[error("compensation failed: {cause}")]
    CompensationFailed {
        /// The transfer's id (record left `FAILED`).
        transfer_id: TransferId,
        /// What went wrong during compensation.
        cause: String,
    },

    /// Coordinator-side invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TransferError {
    /// The terminal status the transfer record was left in, where one exists.
    #[must_use]
    pub const fn terminal_status(&self) -> Option<TransferStatus> {
        match self {
            Self::InsufficientFunds { .. }
            | Self::RemoteUnavailable { .. }
            | Self::CompensationFailed { .. } => Some(TransferStatus::Failed),
            Self::RolledBack { .. } => Some(TransferStatus::RolledBack),
            Self::Validation(_) | Self::NotFound(_) | Self::Internal(_) => None,
        }
    }

    /// The transfer id, where a record exists.
    #[must_use]
    pub const fn transfer_id(&self) -> Option<TransferId> {
        match self {
            Self::InsufficientFunds { transfer_id, .. }
            | Self::RemoteUnavailable { transfer_id, .. }
            | Self::RolledBack { transfer_id, .. }
            | Self::CompensationFailed { transfer_id, .. } => Some(*transfer_id),
            Self::Validation(_) | Self::NotFound(_) | Self::Internal(_) => None,
        }
    }
}

/// API error wrapper for the PSP's HTTP surface.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing caller identity.
    #[error("unauthorized")]
    Unauthorized,

    /// A transfer rejection or failure.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthorized,
                self.to_string(),
                None,
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Internal,
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            Self::Transfer(err) => {
                let details = err.transfer_id().map(|id| {
                    serde_json::json!({
                        "transfer_id": id.to_string(),
                        "status": err.terminal_status(),
                    })
                });
                let (status, code) = match err {
                    TransferError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::Validation),
                    TransferError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
                    TransferError::InsufficientFunds { .. } => {
                        (StatusCode::PAYMENT_REQUIRED, ErrorCode::InsufficientFunds)
                    }
                    TransferError::RemoteUnavailable { .. } => {
                        (StatusCode::BAD_GATEWAY, ErrorCode::RemoteUnavailable)
                    }
                    TransferError::RolledBack { code, .. } => (StatusCode::CONFLICT, *code),
                    TransferError::CompensationFailed { .. } => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorCode::CompensationFailed,
                    ),
                    TransferError::Internal(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Internal)
                    }
                };
                (status, code, err.to_string(), details)
            }
        };

        let body = ApiErrorEnvelope {
            error: ApiErrorBody {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}
