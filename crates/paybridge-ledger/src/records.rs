//! The row types held by a ledger.

use chrono::{DateTime, Utc};
use paybridge_core::{AccountNumber, Amount, Direction, LegId, LegStatus, MoneyError};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// An account row. The balance is only ever mutated through a locked guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// The account number, unique within the owning ledger.
    pub number: AccountNumber,

    /// Current balance in minor units; never negative.
    pub balance: Amount,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the balance last changed.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create an account with an opening balance.
    #[must_use]
    pub fn new(number: AccountNumber, opening_balance: Amount) -> Self {
        let now = Utc::now();
        Self {
            number,
            balance: opening_balance,
            created_at: now,
            updated_at: now,
        }
    }

    /// Credit the account.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::BalanceOverflow` if the sum would exceed the
    /// minor-unit range; the balance is left untouched.
    pub fn deposit(&mut self, amount: Amount) -> Result<(), LedgerError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .map_err(|_| LedgerError::BalanceOverflow(self.number.clone()))?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Debit the account.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InsufficientFunds` if the withdrawal would
    /// drive the balance negative; the balance is left untouched.
    pub fn withdraw(&mut self, amount: Amount) -> Result<(), LedgerError> {
        self.balance = self.balance.checked_sub(amount).map_err(|e| {
            if let MoneyError::Underflow { balance, required } = e {
                LedgerError::InsufficientFunds { balance, required }
            } else {
                LedgerError::InsufficientFunds {
                    balance: self.balance.cents(),
                    required: amount.cents(),
                }
            }
        })?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Overwrite the balance with an authoritative value (mirror refresh).
    pub fn set_balance(&mut self, balance: Amount) {
        self.balance = balance;
        self.updated_at = Utc::now();
    }
}

/// A participant transaction ("leg") row: one withdrawal or deposit intent
/// against one account, tracked through the leg state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegTransaction {
    /// Bank-local leg id.
    pub id: LegId,

    /// The account this leg operates on.
    pub account_number: AccountNumber,

    /// Leg amount in minor units.
    pub amount: Amount,

    /// Withdrawal or deposit.
    pub direction: Direction,

    /// Current state-machine position.
    pub status: LegStatus,

    /// The client-supplied dedupe key, if any.
    pub idempotency_key: Option<String>,

    /// Last error recorded against this leg, for reconciliation.
    pub error: Option<String>,

    /// When the leg was created.
    pub created_at: DateTime<Utc>,

    /// When the status last changed.
    pub updated_at: DateTime<Utc>,
}

impl LegTransaction {
    /// Create a leg in `Initiated` with a fresh id.
    #[must_use]
    pub fn new(
        account_number: AccountNumber,
        direction: Direction,
        amount: Amount,
        idempotency_key: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: LegId::generate(),
            account_number,
            amount,
            direction,
            status: LegStatus::Initiated,
            idempotency_key,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move the leg to `next`, enforcing the state machine.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidTransition` if the edge is not legal.
    pub fn transition(&mut self, next: LegStatus) -> Result<(), LedgerError> {
        if !self.status.can_transition_to(next) {
            return Err(LedgerError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Record an error message alongside a (legal) terminal transition.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidTransition` if the edge is not legal.
    pub fn transition_with_error(
        &mut self,
        next: LegStatus,
        error: impl Into<String>,
    ) -> Result<(), LedgerError> {
        self.transition(next)?;
        self.error = Some(error.into());
        Ok(())
    }
}
