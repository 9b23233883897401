//! The in-process ledger store.
//!
//! Rows live behind `Arc<tokio::sync::Mutex<_>>` so that a lock can be taken
//! as an [`tokio::sync::OwnedMutexGuard`] and held across the awaits of one
//! local operation. The outer maps are only locked long enough to clone the
//! row's `Arc`; they never nest inside a row lock.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use paybridge_core::{AccountNumber, Amount, LegId};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{LedgerError, Result};
use crate::records::{Account, LegTransaction};

/// An exclusive lock on one account row.
pub type AccountGuard = OwnedMutexGuard<Account>;

/// An exclusive lock on one participant transaction row.
pub type TransactionGuard = OwnedMutexGuard<LegTransaction>;

/// An in-process ledger holding accounts and participant transactions.
#[derive(Default)]
pub struct Ledger {
    accounts: RwLock<BTreeMap<AccountNumber, Arc<Mutex<Account>>>>,
    transactions: RwLock<HashMap<LegId, Arc<Mutex<LegTransaction>>>>,
    idempotency: RwLock<HashMap<String, LegId>>,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Insert a new account row.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::DuplicateAccount` if the number is taken.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn insert_account(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.write().expect("accounts lock poisoned");
        if accounts.contains_key(&account.number) {
            return Err(LedgerError::DuplicateAccount(account.number));
        }
        accounts.insert(account.number.clone(), Arc::new(Mutex::new(account)));
        Ok(())
    }

    /// Acquire the exclusive row lock for one account.
    ///
    /// The guard must be dropped before any outbound network call.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountNotFound` for an unknown number.
    pub async fn lock_account(&self, number: &AccountNumber) -> Result<AccountGuard> {
        let row = self.account_row(number)?;
        Ok(row.lock_owned().await)
    }

    /// Acquire the row locks for two distinct accounts.
    ///
    /// Locks are always taken in ascending account-number order regardless of
    /// argument order, so two concurrent pair locks over the same accounts
    /// cannot deadlock. The returned guards match the argument order.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::IdenticalAccounts` if both arguments name the
    /// same account, or `LedgerError::AccountNotFound` if either is unknown.
    pub async fn lock_account_pair(
        &self,
        first: &AccountNumber,
        second: &AccountNumber,
    ) -> Result<(AccountGuard, AccountGuard)> {
        if first == second {
            return Err(LedgerError::IdenticalAccounts(first.clone()));
        }

        let first_row = self.account_row(first)?;
        let second_row = self.account_row(second)?;

        if first < second {
            let a = first_row.lock_owned().await;
            let b = second_row.lock_owned().await;
            Ok((a, b))
        } else {
            let b = second_row.lock_owned().await;
            let a = first_row.lock_owned().await;
            Ok((a, b))
        }
    }

    /// Locked read of one account's balance.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountNotFound` for an unknown number.
    pub async fn balance_of(&self, number: &AccountNumber) -> Result<Amount> {
        let guard = self.lock_account(number).await?;
        Ok(guard.balance)
    }

    /// Snapshot of all accounts as `(number, balance)`, in number order.
    ///
    /// Each row is locked briefly in turn; the snapshot is consistent per
    /// row, not across rows.
    pub async fn snapshot_accounts(&self) -> Vec<(AccountNumber, Amount)> {
        let rows: Vec<(AccountNumber, Arc<Mutex<Account>>)> = {
            let accounts = self.accounts.read().expect("accounts lock poisoned");
            accounts
                .iter()
                .map(|(k, v)| (k.clone(), Arc::clone(v)))
                .collect()
        };

        let mut out = Vec::with_capacity(rows.len());
        for (number, row) in rows {
            let guard = row.lock().await;
            out.push((number, guard.balance));
        }
        out
    }

    fn account_row(&self, number: &AccountNumber) -> Result<Arc<Mutex<Account>>> {
        let accounts = self.accounts.read().expect("accounts lock poisoned");
        accounts
            .get(number)
            .cloned()
            .ok_or_else(|| LedgerError::AccountNotFound(number.clone()))
    }

    // =========================================================================
    // Participant transactions
    // =========================================================================

    /// Insert a new leg row, registering its idempotency key if present.
    ///
    /// Returns the leg id.
    ///
    /// # Panics
    ///
    /// Panics if an internal lock is poisoned.
    pub fn create_transaction(&self, leg: LegTransaction) -> LegId {
        let id = leg.id;
        if let Some(key) = leg.idempotency_key.clone() {
            self.idempotency
                .write()
                .expect("idempotency lock poisoned")
                .insert(key, id);
        }
        self.transactions
            .write()
            .expect("transactions lock poisoned")
            .insert(id, Arc::new(Mutex::new(leg)));
        id
    }

    /// Acquire the exclusive row lock for one leg.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::TransactionNotFound` for an unknown id.
    pub async fn lock_transaction(&self, id: LegId) -> Result<TransactionGuard> {
        let row = {
            let transactions = self.transactions.read().expect("transactions lock poisoned");
            transactions
                .get(&id)
                .cloned()
                .ok_or(LedgerError::TransactionNotFound(id))?
        };
        Ok(row.lock_owned().await)
    }

    /// Look up a leg id by its idempotency key.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn find_by_idempotency_key(&self, key: &str) -> Option<LegId> {
        self.idempotency
            .read()
            .expect("idempotency lock poisoned")
            .get(key)
            .copied()
    }
}
