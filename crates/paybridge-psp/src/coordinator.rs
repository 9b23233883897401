//! The transfer coordinator: the two-phase protocol and its compensation.
//!
//! One transfer is driven to a terminal state by the worker handling the
//! request. The two participant calls of each phase run concurrently and are
//! individually bounded by the phase deadline; phases are strictly
//! sequential. Mirror-row locks are held only during local validation and
//! released before the first network call - each bank's own row locking
//! plus terminal-state bookkeeping here is what detects and compensates
//! conflicts.

use std::sync::Arc;
use std::time::Duration;

use paybridge_core::{
    AccountCipher, AccountNumber, Amount, BankName, Direction, ErrorCode, LegId, LegResponse,
    LegStatus, PrepareRequest, TransferId, TransferRequest, TransferResponse, TransferStatus,
};
use paybridge_ledger::LedgerError;

use crate::adapter::{AdapterError, BankAdapter};
use crate::directory::BankDirectory;
use crate::error::TransferError;
use crate::mirror::{MirrorMeta, MirrorStore};
use crate::transfers::{TransferRecord, TransferStore};

/// Drives cross-bank transfers through prepare/commit with compensating
/// rollback.
pub struct TransferCoordinator {
    mirror: MirrorStore,
    transfers: TransferStore,
    banks: BankDirectory,
    cipher: AccountCipher,
    phase_deadline: Duration,
}

impl TransferCoordinator {
    /// Create a coordinator.
    #[must_use]
    pub fn new(
        mirror: MirrorStore,
        banks: BankDirectory,
        cipher: AccountCipher,
        phase_deadline: Duration,
    ) -> Self {
        Self {
            mirror,
            transfers: TransferStore::new(),
            banks,
            cipher,
            phase_deadline,
        }
    }

    /// Execute one transfer to a terminal state.
    ///
    /// # Errors
    ///
    /// Every non-`SUCCESS` outcome is an error carrying the terminal state
    /// the transfer record was left in (where a record exists); see
    /// [`TransferError`].
    pub async fn transfer(
        &self,
        caller: &str,
        request: &TransferRequest,
    ) -> Result<TransferResponse, TransferError> {
        let source_number = &request.source_account_number;
        let destination_number = &request.destination_account_number;

        // ---- Step 1: local validation under the mirror locks -------------
        if source_number == destination_number {
            return Err(TransferError::Validation(
                "source and destination accounts cannot be the same".into(),
            ));
        }
        if request.amount_cents.is_zero() {
            return Err(TransferError::Validation(
                "transfer amount must be positive".into(),
            ));
        }

        let source_meta = self
            .mirror
            .meta(source_number)
            .filter(|m| m.owner == caller)
            .cloned()
            .ok_or_else(|| TransferError::NotFound("source account not found".into()))?;
        let destination_meta = self
            .mirror
            .meta(destination_number)
            .cloned()
            .ok_or_else(|| TransferError::NotFound("destination account not found".into()))?;

        let transfer_id = self
            .initiate(caller, request, &source_meta, &destination_meta)
            .await?;

        tracing::info!(
            transfer_id = %transfer_id,
            source = %source_number,
            destination = %destination_number,
            amount = %request.amount_cents,
            "Transfer initiated"
        );

        // ---- Step 2: resolve both adapters; nothing sent yet -------------
        let source_bank = self.resolve(transfer_id, &source_meta)?;
        let destination_bank = self.resolve(transfer_id, &destination_meta)?;

        let source_ciphertext = self.encrypt(transfer_id, source_number)?;
        let destination_ciphertext = self.encrypt(transfer_id, destination_number)?;

        // ---- Step 3: prepare both legs concurrently ----------------------
        let source_prepare = PrepareRequest {
            account_number: source_ciphertext.clone(),
            direction: Direction::Withdrawal,
            amount_cents: request.amount_cents,
            idempotency_key: ulid::Ulid::new().to_string(),
        };
        let destination_prepare = PrepareRequest {
            account_number: destination_ciphertext.clone(),
            direction: Direction::Deposit,
            amount_cents: request.amount_cents,
            idempotency_key: ulid::Ulid::new().to_string(),
        };

        let (source_prepared, destination_prepared) = tokio::join!(
            self.bounded(source_bank.prepare(&source_prepare)),
            self.bounded(destination_bank.prepare(&destination_prepare)),
        );

        let source_leg = source_prepared.as_ref().ok().map(|r| r.transaction_id);
        let destination_leg = destination_prepared.as_ref().ok().map(|r| r.transaction_id);
        self.transfers
            .set_legs(transfer_id, source_leg, destination_leg);

        // ---- Step 4: any non-PREPARED answer aborts the transfer ---------
        let legs: [(&dyn BankAdapter, Option<LegId>); 2] = [
            (source_bank.as_ref(), source_leg),
            (destination_bank.as_ref(), destination_leg),
        ];

        if let Some((code, cause)) = leg_failure(source_bank.as_ref(), &source_prepared, LegStatus::Prepared)
            .or_else(|| {
                leg_failure(
                    destination_bank.as_ref(),
                    &destination_prepared,
                    LegStatus::Prepared,
                )
            })
        {
            tracing::warn!(transfer_id = %transfer_id, cause = %cause, "Prepare phase failed");
            return Err(self.roll_back(transfer_id, &legs, code, cause).await);
        }

        self.transfers
            .set_status(transfer_id, TransferStatus::Prepared, None);
        tracing::info!(transfer_id = %transfer_id, "Transfer prepared");

        // Both legs answered PREPARED, so both ids exist.
        let (Some(source_leg_id), Some(destination_leg_id)) = (source_leg, destination_leg) else {
            let cause = "prepared leg without a transaction id".to_string();
            return Err(self
                .roll_back(transfer_id, &legs, ErrorCode::Internal, cause)
                .await);
        };

        // ---- Steps 5-6: commit both legs concurrently --------------------
        let (source_committed, destination_committed) = tokio::join!(
            self.bounded(source_bank.commit(source_leg_id)),
            self.bounded(destination_bank.commit(destination_leg_id)),
        );

        if let Some((code, cause)) = leg_failure(source_bank.as_ref(), &source_committed, LegStatus::Committed)
            .or_else(|| {
                leg_failure(
                    destination_bank.as_ref(),
                    &destination_committed,
                    LegStatus::Committed,
                )
            })
        {
            tracing::warn!(transfer_id = %transfer_id, cause = %cause, "Commit phase failed");
            return Err(self.roll_back(transfer_id, &legs, code, cause).await);
        }

        self.transfers
            .set_status(transfer_id, TransferStatus::Committed, None);
        tracing::info!(transfer_id = %transfer_id, "Transfer committed");

        // ---- Step 7: refresh the mirror from the authoritative balances --
        self.refresh_mirror(source_bank.as_ref(), source_number, &source_ciphertext)
            .await;
        self.refresh_mirror(
            destination_bank.as_ref(),
            destination_number,
            &destination_ciphertext,
        )
        .await;

        // ---- Step 8: done -------------------------------------------------
        let message = "Transaction completed successfully".to_string();
        self.transfers
            .set_status(transfer_id, TransferStatus::Success, Some(message.clone()));
        tracing::info!(transfer_id = %transfer_id, "Transfer succeeded");

        Ok(TransferResponse {
            transfer_id,
            status: TransferStatus::Success,
            message,
        })
    }

    /// Transfer history over the caller's own accounts, newest first.
    #[must_use]
    pub fn history(&self, caller: &str) -> Vec<TransferRecord> {
        let accounts = self.mirror.account_numbers_of(caller);
        self.transfers.history_for(&accounts)
    }

    /// The caller's mirrored accounts with cached balances.
    pub async fn accounts(
        &self,
        caller: &str,
    ) -> Vec<(AccountNumber, BankName, Amount)> {
        self.mirror.accounts_of(caller).await
    }

    /// Fetch one transfer record.
    #[must_use]
    pub fn get(&self, id: TransferId) -> Option<TransferRecord> {
        self.transfers.get(id)
    }

    // =========================================================================
    // Protocol steps
    // =========================================================================

    /// Validate balances under the mirror pair lock and create the record.
    /// Locks are released when this returns, before any network call.
    async fn initiate(
        &self,
        caller: &str,
        request: &TransferRequest,
        source_meta: &MirrorMeta,
        destination_meta: &MirrorMeta,
    ) -> Result<TransferId, TransferError> {
        let (source_guard, _destination_guard) = self
            .mirror
            .lock_pair(
                &request.source_account_number,
                &request.destination_account_number,
            )
            .await
            .map_err(|e| match e {
                LedgerError::AccountNotFound(n) => {
                    TransferError::NotFound(format!("account not found: {n}"))
                }
                other => TransferError::Internal(other.to_string()),
            })?;

        let record = TransferRecord::new(
            caller.to_string(),
            request.source_account_number.clone(),
            source_meta.bank.clone(),
            request.destination_account_number.clone(),
            destination_meta.bank.clone(),
            request.amount_cents,
        );

        if source_guard.balance < request.amount_cents {
            let balance = source_guard.balance.cents();
            let required = request.amount_cents.cents();
            let transfer_id = self.transfers.insert(record);
            self.transfers.set_status(
                transfer_id,
                TransferStatus::Failed,
                Some(format!(
                    "insufficient funds in source account: balance={balance}, required={required}"
                )),
            );
            return Err(TransferError::InsufficientFunds {
                transfer_id,
                balance,
                required,
            });
        }

        Ok(self.transfers.insert(record))
    }

    fn resolve(
        &self,
        transfer_id: TransferId,
        meta: &MirrorMeta,
    ) -> Result<Arc<dyn BankAdapter>, TransferError> {
        self.banks.resolve(&meta.bank).ok_or_else(|| {
            let message = format!("no client adapter for bank {}", meta.bank);
            tracing::error!(transfer_id = %transfer_id, bank = %meta.bank, "Bank client unavailable");
            self.transfers
                .set_status(transfer_id, TransferStatus::Failed, Some(message.clone()));
            TransferError::RemoteUnavailable {
                transfer_id,
                message,
            }
        })
    }

    fn encrypt(
        &self,
        transfer_id: TransferId,
        number: &AccountNumber,
    ) -> Result<String, TransferError> {
        self.cipher.encrypt(number.as_str()).map_err(|e| {
            let message = format!("account number encryption failed: {e}");
            self.transfers
                .set_status(transfer_id, TransferStatus::Failed, Some(message.clone()));
            TransferError::Internal(message)
        })
    }

    /// Bound one participant call by the phase deadline. Expiry is treated
    /// exactly like an unreachable bank and drives the rollback path.
    async fn bounded<F>(&self, call: F) -> Result<LegResponse, AdapterError>
    where
        F: std::future::Future<Output = Result<LegResponse, AdapterError>>,
    {
        match tokio::time::timeout(self.phase_deadline, call).await {
            Ok(result) => result,
            Err(_) => Err(AdapterError::Unreachable("phase deadline exceeded".into())),
        }
    }

    /// Compensate every leg that exists, then record the terminal state.
    ///
    /// Compensation succeeding means both ledgers are back to their
    /// pre-transfer state (`ROLLED_BACK`); compensation failing is the one
    /// outcome that demands operator attention (`FAILED`).
    async fn roll_back(
        &self,
        transfer_id: TransferId,
        legs: &[(&dyn BankAdapter, Option<LegId>)],
        code: ErrorCode,
        cause: String,
    ) -> TransferError {
        let mut compensation_failures = Vec::new();

        for (adapter, leg) in legs {
            let Some(leg_id) = leg else { continue };

            match self.bounded(adapter.rollback(*leg_id)).await {
                Ok(response)
                    if matches!(
                        response.status,
                        LegStatus::RolledBack | LegStatus::Aborted
                    ) =>
                {
                    tracing::info!(
                        transfer_id = %transfer_id,
                        bank = %adapter.bank(),
                        leg = %leg_id,
                        status = %response.status,
                        "Leg compensated"
                    );
                }
                Ok(response) => {
                    compensation_failures.push(format!(
                        "{}: leg {} ended {} ({})",
                        adapter.bank(),
                        leg_id,
                        response.status,
                        response.message
                    ));
                }
                Err(e) => {
                    compensation_failures.push(format!("{}: {}", adapter.bank(), e));
                }
            }
        }

        if compensation_failures.is_empty() {
            self.transfers
                .set_status(transfer_id, TransferStatus::RolledBack, Some(cause.clone()));
            tracing::info!(transfer_id = %transfer_id, "Transfer rolled back");
            TransferError::RolledBack {
                transfer_id,
                code,
                cause,
            }
        } else {
            let detail = compensation_failures.join("; ");
            let message = format!("{cause}; compensation failed: {detail}");
            self.transfers
                .set_status(transfer_id, TransferStatus::Failed, Some(message.clone()));
            tracing::error!(
                transfer_id = %transfer_id,
                failures = %detail,
                "Compensation failed; ledgers may be inconsistent"
            );
            TransferError::CompensationFailed {
                transfer_id,
                cause: message,
            }
        }
    }

    /// Pull the authoritative balance and update the cached mirror row.
    /// A refresh failure does not un-commit anything; the stale cache is
    /// logged and corrected by the next successful transfer.
    async fn refresh_mirror(
        &self,
        adapter: &dyn BankAdapter,
        number: &AccountNumber,
        ciphertext: &str,
    ) {
        match tokio::time::timeout(self.phase_deadline, adapter.get_balance(ciphertext)).await {
            Ok(Ok(balance)) => match self.mirror.lock(number).await {
                Ok(mut guard) => {
                    guard.set_balance(balance);
                    tracing::debug!(
                        account = %number,
                        balance = %balance,
                        "Mirror balance refreshed"
                    );
                }
                Err(e) => {
                    tracing::warn!(account = %number, error = %e, "Mirror row missing on refresh");
                }
            },
            Ok(Err(e)) => {
                tracing::warn!(account = %number, error = %e, "Mirror refresh failed; cache is stale");
            }
            Err(_) => {
                tracing::warn!(account = %number, "Mirror refresh timed out; cache is stale");
            }
        }
    }
}

/// How a leg's phase result failed, if it did.
fn leg_failure(
    adapter: &dyn BankAdapter,
    result: &Result<LegResponse, AdapterError>,
    expected: LegStatus,
) -> Option<(ErrorCode, String)> {
    match result {
        Err(e) => Some((e.code(), format!("{}: {e}", adapter.bank()))),
        Ok(r) if r.status != expected => Some((
            ErrorCode::Internal,
            format!("{} reported {}: {}", adapter.bank(), r.status, r.message),
        )),
        Ok(_) => None,
    }
}
