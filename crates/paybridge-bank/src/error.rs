//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use paybridge_core::{ApiErrorBody, ApiErrorEnvelope, CryptoError, ErrorCode};
use paybridge_ledger::LedgerError;

/// API error type for the bank service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or wrong API key.
    #[error("unauthorized")]
    Unauthorized,

    /// Account or transaction unknown to this bank.
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation requested against a transaction in an ineligible state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Malformed request (undecryptable account number, bad body, ...).
    #[error("validation: {0}")]
    Validation(String),

    /// Withdrawal would drive the balance negative.
    #[error("insufficient funds: balance={balance}, required={required}")]
    InsufficientFunds {
        /// Current balance in minor units.
        balance: i64,
        /// Required amount in minor units.
        required: i64,
    },

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
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg.clone(), None),
            Self::InvalidState(msg) => (
                StatusCode::CONFLICT,
                ErrorCode::InvalidState,
                msg.clone(),
                None,
            ),
            Self::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorCode::Validation,
                msg.clone(),
                None,
            ),
            Self::InsufficientFunds { balance, required } => (
                StatusCode::PAYMENT_REQUIRED,
                ErrorCode::InsufficientFunds,
                self.to_string(),
                Some(serde_json::json!({
                    "balance": balance,
                    "required": required
                })),
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

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AccountNotFound(n) => Self::NotFound(format!("account not found: {n}")),
            LedgerError::TransactionNotFound(id) => {
                Self::NotFound(format!("transaction not found: {id}"))
            }
            LedgerError::InsufficientFunds { balance, required } => {
                Self::InsufficientFunds { balance, required }
            }
            LedgerError::InvalidTransition { from, to } => {
                Self::InvalidState(format!("invalid transition: {from} -> {to}"))
            }
            LedgerError::DuplicateAccount(n) => {
                Self::Validation(format!("account already exists: {n}"))
            }
            LedgerError::BalanceOverflow(n) => {
                Self::Internal(format!("balance overflow on account {n}"))
            }
            LedgerError::IdenticalAccounts(n) => {
                Self::Validation(format!("account pair is identical: {n}"))
            }
        }
    }
}

impl From<CryptoError> for ApiError {
    fn from(_: CryptoError) -> Self {
        // The distinction between malformed input and a key mismatch is
        // deliberately not surfaced to the caller.
        Self::Validation("could not decrypt account number".into())
    }
}
