//! The participant-side transaction state machine.
//!
//! `TellerService` owns every state transition a leg can take inside this
//! bank. Domain failures are recovered locally into a terminal status and
//! reported in the response body; only protocol misuse (unknown id, commit
//! against an ineligible state, bad credential, undecryptable account
//! number) surfaces as an HTTP error.

use std::sync::Arc;

use paybridge_core::{
    AccountCipher, AccountNumber, AccountSummary, BalanceRequest, BalanceResponse, Direction,
    LegId, LegResponse, LegStatus, ListAccountsResponse, PrepareRequest,
};
use paybridge_ledger::{Ledger, LegTransaction};

use crate::error::ApiError;

/// The participant service: prepare, commit, rollback, and balance reads
/// over this bank's ledger.
#[derive(Clone)]
pub struct TellerService {
    bank_name: String,
    ledger: Arc<Ledger>,
    cipher: AccountCipher,
}

impl TellerService {
    /// Create a teller over a ledger.
    #[must_use]
    pub fn new(bank_name: String, ledger: Arc<Ledger>, cipher: AccountCipher) -> Self {
        Self {
            bank_name,
            ledger,
            cipher,
        }
    }

    /// Prepare one leg: validate the account exists and reserve a transaction
    /// record. No balance is touched here; sufficiency for a withdrawal is
    /// deferred to commit so that balance changes between the phases are
    /// handled where the delta is actually applied.
    pub async fn prepare(&self, request: &PrepareRequest) -> Result<LegResponse, ApiError> {
        let account_number = self.decrypt_account_number(&request.account_number)?;

        if let Some(existing) = self.ledger.find_by_idempotency_key(&request.idempotency_key) {
            let leg = self.ledger.lock_transaction(existing).await?;
            tracing::info!(
                bank = %self.bank_name,
                transaction_id = %leg.id,
                idempotency_key = %request.idempotency_key,
                "Duplicate prepare; returning existing transaction"
            );
            return Ok(LegResponse {
                transaction_id: leg.id,
                status: leg.status,
                message: format!("Duplicate prepare; transaction already exists: {}", leg.id),
            });
        }

        // Existence check under the account's row lock.
        let account = self.ledger.lock_account(&account_number).await?;

        let mut leg = LegTransaction::new(
            account_number.clone(),
            request.direction,
            request.amount_cents,
            Some(request.idempotency_key.clone()),
        );
        leg.transition(LegStatus::Prepared)?;
        let id = self.ledger.create_transaction(leg);
        drop(account);

        tracing::info!(
            bank = %self.bank_name,
            transaction_id = %id,
            account = %account_number,
            direction = %request.direction,
            amount = %request.amount_cents,
            "Transaction prepared"
        );

        Ok(LegResponse {
            transaction_id: id,
            status: LegStatus::Prepared,
            message: format!("Transaction prepared successfully: {id}"),
        })
    }

    /// Commit a prepared leg: apply the balance delta under the account lock.
    ///
    /// A commit that cannot apply its delta (insufficient funds on a
    /// withdrawal) leaves the account unmodified, marks the leg `ABORTED`,
    /// and reports the failure in the response body.
    pub async fn commit(&self, id: LegId) -> Result<LegResponse, ApiError> {
        let mut leg = self.ledger.lock_transaction(id).await?;

        if leg.status != LegStatus::Prepared {
            return Err(ApiError::InvalidState(format!(
                "transaction is not prepared for commit: {}",
                leg.status
            )));
        }

        let mut account = self.ledger.lock_account(&leg.account_number).await?;
        leg.transition(LegStatus::Committing)?;

        let applied = match leg.direction {
            Direction::Withdrawal => account.withdraw(leg.amount),
            Direction::Deposit => account.deposit(leg.amount),
        };

        match applied {
            Ok(()) => {
                leg.transition(LegStatus::Committed)?;
                tracing::info!(
                    bank = %self.bank_name,
                    transaction_id = %id,
                    account = %leg.account_number,
                    balance = %account.balance,
                    "Transaction committed"
                );
                Ok(LegResponse {
                    transaction_id: id,
                    status: LegStatus::Committed,
                    message: format!("Transaction committed successfully: {id}"),
                })
            }
            Err(e) => {
                leg.transition_with_error(LegStatus::Aborted, e.to_string())?;
                tracing::warn!(
                    bank = %self.bank_name,
                    transaction_id = %id,
                    error = %e,
                    "Transaction commit aborted"
                );
                Ok(LegResponse {
                    transaction_id: id,
                    status: LegStatus::Aborted,
                    message: format!("Transaction commit failed: {id} - {e}"),
                })
            }
        }
    }

    /// Roll back a leg.
    ///
    /// A leg that never committed is simply marked `ROLLED_BACK`; a committed
    /// leg has its delta reversed under the account lock first. Repeating a
    /// rollback is a no-op, and rolling back an aborted commit has nothing to
    /// undo.
    pub async fn rollback(&self, id: LegId) -> Result<LegResponse, ApiError> {
        let mut leg = self.ledger.lock_transaction(id).await?;

        match leg.status {
            LegStatus::Initiated | LegStatus::Prepared => {
                leg.transition(LegStatus::RolledBack)?;
                tracing::info!(
                    bank = %self.bank_name,
                    transaction_id = %id,
                    "Unapplied transaction rolled back"
                );
                Ok(LegResponse {
                    transaction_id: id,
                    status: LegStatus::RolledBack,
                    message: format!("Transaction rolled back successfully: {id}"),
                })
            }
            LegStatus::RolledBack => Ok(LegResponse {
                transaction_id: id,
                status: LegStatus::RolledBack,
                message: format!("Transaction already rolled back: {id}"),
            }),
            LegStatus::Aborted => Ok(LegResponse {
                transaction_id: id,
                status: LegStatus::Aborted,
                message: format!("Nothing to roll back; commit was aborted: {id}"),
            }),
            LegStatus::Failed => Ok(LegResponse {
                transaction_id: id,
                status: LegStatus::Failed,
                message: format!("Transaction requires manual reconciliation: {id}"),
            }),
            LegStatus::Committed => {
                let mut account = self.ledger.lock_account(&leg.account_number).await?;
                leg.transition(LegStatus::RollingBack)?;

                let undone = match leg.direction.inverse() {
                    Direction::Deposit => account.deposit(leg.amount),
                    Direction::Withdrawal => account.withdraw(leg.amount),
                };

                match undone {
                    Ok(()) => {
                        leg.transition(LegStatus::RolledBack)?;
                        tracing::info!(
                            bank = %self.bank_name,
                            transaction_id = %id,
                            account = %leg.account_number,
                            balance = %account.balance,
                            "Committed transaction rolled back"
                        );
                        Ok(LegResponse {
                            transaction_id: id,
                            status: LegStatus::RolledBack,
                            message: format!("Transaction rolled back successfully: {id}"),
                        })
                    }
                    Err(e) => {
                        leg.transition_with_error(LegStatus::Failed, e.to_string())?;
                        tracing::error!(
                            bank = %self.bank_name,
                            transaction_id = %id,
                            error = %e,
                            "Rollback failed; ledger requires manual reconciliation"
                        );
                        Ok(LegResponse {
                            transaction_id: id,
                            status: LegStatus::Failed,
                            message: format!("Transaction rollback failed: {id} - {e}"),
                        })
                    }
                }
            }
            LegStatus::Committing | LegStatus::RollingBack => Err(ApiError::InvalidState(format!(
                "transaction is mid-flight: {}",
                leg.status
            ))),
        }
    }

    /// Locked read of the authoritative balance.
    pub async fn balance(&self, request: &BalanceRequest) -> Result<BalanceResponse, ApiError> {
        let account_number = self.decrypt_account_number(&request.account_number)?;
        let balance = self.ledger.balance_of(&account_number).await?;
        Ok(BalanceResponse {
            balance_cents: balance,
        })
    }

    /// Snapshot of this bank's accounts.
    pub async fn list_accounts(&self) -> ListAccountsResponse {
        let accounts = self
            .ledger
            .snapshot_accounts()
            .await
            .into_iter()
            .map(|(account_number, balance_cents)| AccountSummary {
                account_number,
                balance_cents,
            })
            .collect();
        ListAccountsResponse { accounts }
    }

    fn decrypt_account_number(&self, ciphertext: &str) -> Result<AccountNumber, ApiError> {
        let plaintext = self.cipher.decrypt(ciphertext)?;
        plaintext
            .parse()
            .map_err(|_| ApiError::Validation("account number is empty".into()))
    }
}
