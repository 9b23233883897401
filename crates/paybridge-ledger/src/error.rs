//! Error types for the ledger store.

use paybridge_core::{AccountNumber, LegId, LegStatus};

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// No account with the given number exists in this ledger.
    #[error("account not found: {0}")]
    AccountNotFound(AccountNumber),

    /// No participant transaction with the given id exists in this ledger.
    #[error("transaction not found: {0}")]
    TransactionNotFound(LegId),

    /// An account with the given number already exists.
    #[error("account already exists: {0}")]
    DuplicateAccount(AccountNumber),

    /// A withdrawal would drive the balance negative.
    #[error("insufficient funds: balance={balance}, required={required}")]
    InsufficientFunds {
        /// Current balance in minor units.
        balance: i64,
        /// Required amount in minor units.
        required: i64,
    },

    /// A deposit overflowed the minor-unit range.
    #[error("balance overflow on account {0}")]
    BalanceOverflow(AccountNumber),

    /// A status change that the leg state machine does not allow.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// The leg's current status.
        from: LegStatus,
        /// The requested status.
        to: LegStatus,
    },

    /// Both sides of a pair lock named the same account.
    #[error("cannot lock an account pair against itself: {0}")]
    IdenticalAccounts(AccountNumber),
}
