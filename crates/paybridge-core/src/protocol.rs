//! Wire protocol between the PSP and the participant banks.
//!
//! These are the JSON bodies carried over HTTP; the bank service decodes the
//! requests, the client SDK encodes them, and both sides share the error
//! envelope. Account numbers are always the AEAD ciphertext produced by
//! [`crate::AccountCipher`], never the plaintext.

use serde::{Deserialize, Serialize};

use crate::ids::{AccountNumber, LegId, TransferId};
use crate::money::Amount;
use crate::status::{Direction, LegStatus, TransferStatus};

// ============================================================================
// Participant protocol (PSP -> bank)
// ============================================================================

/// Prepare one leg of a transfer at a bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareRequest {
    /// AEAD-encrypted account number.
    pub account_number: String,
    /// Whether this leg withdraws from or deposits to the account.
    pub direction: Direction,
    /// Leg amount in minor units.
    pub amount_cents: Amount,
    /// Client-generated key the bank dedupes on; a retried prepare with the
    /// same key returns the original leg instead of creating a second one.
    pub idempotency_key: String,
}

/// Response to any participant operation (prepare, commit, rollback).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegResponse {
    /// The bank-local leg id; addresses commit and rollback.
    pub transaction_id: LegId,
    /// The leg's status after the operation.
    pub status: LegStatus,
    /// Human-readable outcome description.
    pub message: String,
}

/// Locked balance read for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceRequest {
    /// AEAD-encrypted account number.
    pub account_number: String,
}

/// The authoritative balance held by the bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    /// Current balance in minor units.
    pub balance_cents: Amount,
}

/// One account in a bank's (or the PSP mirror's) listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSummary {
    /// The plaintext account number; listings never cross a trust boundary.
    pub account_number: AccountNumber,
    /// Balance in minor units.
    pub balance_cents: Amount,
}

/// A bank's account listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListAccountsResponse {
    /// All accounts, in account-number order.
    pub accounts: Vec<AccountSummary>,
}

// ============================================================================
// Coordinator surface (caller -> PSP)
// ============================================================================

/// Request a cross-bank transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Account money leaves.
    pub source_account_number: AccountNumber,
    /// Account money enters.
    pub destination_account_number: AccountNumber,
    /// Transfer amount in minor units; must be positive.
    pub amount_cents: Amount,
}

/// Terminal outcome of a transfer request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResponse {
    /// The PSP-local transfer id.
    pub transfer_id: TransferId,
    /// Final status. `ROLLED_BACK` is a safe, fully-compensated outcome;
    /// `FAILED` requires manual reconciliation.
    pub status: TransferStatus,
    /// Human-readable outcome description.
    pub message: String,
}

// ============================================================================
// Error envelope
// ============================================================================

/// Machine-readable error codes carried in the error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Account or transaction id unknown to the addressed party.
    NotFound,
    /// Commit/rollback requested against an ineligible state.
    InvalidState,
    /// Withdrawal would drive the balance negative.
    InsufficientFunds,
    /// Malformed request (bad amount, same source/destination, ...).
    Validation,
    /// Missing or wrong credential.
    Unauthorized,
    /// A bank adapter could not be resolved or reached.
    RemoteUnavailable,
    /// Rollback itself failed after a partial commit; ledgers may disagree.
    CompensationFailed,
    /// Anything the service cannot attribute to the caller.
    Internal,
}

/// Body of the error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Machine-readable code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Optional structured context (balances, ids, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// The envelope every non-2xx response carries: `{"error": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorEnvelope {
    /// The error body.
    pub error: ApiErrorBody,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_request_wire_shape() {
        let req = PrepareRequest {
            account_number: "b64ciphertext".into(),
            direction: Direction::Withdrawal,
            amount_cents: Amount::from_cents(300).unwrap(),
            idempotency_key: "01J0000000000000000000TEST".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["direction"], "WITHDRAWAL");
        assert_eq!(json["amount_cents"], 300);
    }

    #[test]
    fn error_envelope_roundtrip() {
        let env = ApiErrorEnvelope {
            error: ApiErrorBody {
                code: ErrorCode::InsufficientFunds,
                message: "insufficient funds".into(),
                details: Some(serde_json::json!({ "balance": 100, "required": 300 })),
            },
        };
        let json = serde_json::to_string(&env).unwrap();
        let back: ApiErrorEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back.error.code, ErrorCode::InsufficientFunds);
    }

    #[test]
    fn error_code_wire_form_is_snake_case() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::CompensationFailed).unwrap(),
            "\"compensation_failed\""
        );
    }

    #[test]
    fn details_omitted_when_absent() {
        let env = ApiErrorEnvelope {
            error: ApiErrorBody {
                code: ErrorCode::NotFound,
                message: "account not found".into(),
                details: None,
            },
        };
        let json = serde_json::to_string(&env).unwrap();
        assert!(!json.contains("details"));
    }
}
