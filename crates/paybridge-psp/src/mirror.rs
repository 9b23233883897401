//! The PSP's mirrored view of the accounts it tracks.
//!
//! The mirror is the coordinator's own bookkeeping: which bank owns each
//! account, which caller owns it at the PSP, and the last balance the bank
//! reported. Balances here are a cache - refreshed only after a successful
//! commit and never authoritative for concurrency decisions. The bank/owner
//! metadata is immutable after seeding.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use paybridge_core::{AccountNumber, Amount, BankName};
use paybridge_ledger::{Account, AccountGuard, Ledger, LedgerError};

/// One mirrored account at seeding time.
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorSeed {
    /// The account number as the owning bank knows it.
    pub account_number: AccountNumber,
    /// The bank that owns the account.
    pub bank: BankName,
    /// The caller identity that owns the account at the PSP.
    pub owner: String,
    /// Last known balance in minor units.
    pub balance_cents: Amount,
}

/// Immutable per-account metadata.
#[derive(Debug, Clone)]
pub struct MirrorMeta {
    /// The bank that owns the account.
    pub bank: BankName,
    /// The caller identity that owns the account at the PSP.
    pub owner: String,
}

/// The mirrored account store: locked balance rows plus immutable metadata.
///
/// Balance rows reuse the ledger's exclusive row locks so that transfer
/// initiation can hold both mirror rows (in canonical order) while it
/// validates, and release them before any network call.
#[derive(Clone)]
pub struct MirrorStore {
    ledger: Arc<Ledger>,
    meta: Arc<HashMap<AccountNumber, MirrorMeta>>,
}

impl MirrorStore {
    /// Build a mirror from seeds.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::DuplicateAccount` if a number is seeded twice.
    pub fn from_seeds(seeds: Vec<MirrorSeed>) -> Result<Self, LedgerError> {
        let ledger = Ledger::new();
        let mut meta = HashMap::with_capacity(seeds.len());

        for seed in seeds {
            ledger.insert_account(Account::new(
                seed.account_number.clone(),
                seed.balance_cents,
            ))?;
            meta.insert(
                seed.account_number,
                MirrorMeta {
                    bank: seed.bank,
                    owner: seed.owner,
                },
            );
        }

        Ok(Self {
            ledger: Arc::new(ledger),
            meta: Arc::new(meta),
        })
    }

    /// Metadata for one account, if the PSP tracks it.
    #[must_use]
    pub fn meta(&self, number: &AccountNumber) -> Option<&MirrorMeta> {
        self.meta.get(number)
    }

    /// Lock one mirror row.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountNotFound` for an untracked number.
    pub async fn lock(&self, number: &AccountNumber) -> Result<AccountGuard, LedgerError> {
        self.ledger.lock_account(number).await
    }

    /// Lock two mirror rows in canonical order (guards in argument order).
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::IdenticalAccounts` or `AccountNotFound`.
    pub async fn lock_pair(
        &self,
        first: &AccountNumber,
        second: &AccountNumber,
    ) -> Result<(AccountGuard, AccountGuard), LedgerError> {
        self.ledger.lock_account_pair(first, second).await
    }

    /// All accounts owned by a caller, with cached balances.
    pub async fn accounts_of(&self, owner: &str) -> Vec<(AccountNumber, BankName, Amount)> {
        let mut out = Vec::new();
        for (number, balance) in self.ledger.snapshot_accounts().await {
            if let Some(meta) = self.meta.get(&number) {
                if meta.owner == owner {
                    out.push((number, meta.bank.clone(), balance));
                }
            }
        }
        out
    }

    /// Account numbers owned by a caller.
    #[must_use]
    pub fn account_numbers_of(&self, owner: &str) -> Vec<AccountNumber> {
        self.meta
            .iter()
            .filter(|(_, m)| m.owner == owner)
            .map(|(n, _)| n.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeds() -> Vec<MirrorSeed> {
        vec![
            MirrorSeed {
                account_number: AccountNumber::new("1001").unwrap(),
                bank: BankName::new("CIB"),
                owner: "farid".into(),
                balance_cents: Amount::from_cents(100_000).unwrap(),
            },
            MirrorSeed {
                account_number: AccountNumber::new("2001").unwrap(),
                bank: BankName::new("NBE"),
                owner: "nadia".into(),
                balance_cents: Amount::from_cents(50_000).unwrap(),
            },
        ]
    }

    #[tokio::test]
    async fn seeded_accounts_are_tracked() {
        let mirror = MirrorStore::from_seeds(seeds()).unwrap();
        let number = AccountNumber::new("1001").unwrap();

        let meta = mirror.meta(&number).unwrap();
        assert_eq!(meta.bank.as_str(), "CIB");
        assert_eq!(meta.owner, "farid");

        let guard = mirror.lock(&number).await.unwrap();
        assert_eq!(guard.balance.cents(), 100_000);
    }

    #[tokio::test]
    async fn accounts_of_filters_by_owner() {
        let mirror = MirrorStore::from_seeds(seeds()).unwrap();

        let farid = mirror.accounts_of("farid").await;
        assert_eq!(farid.len(), 1);
        assert_eq!(farid[0].0.as_str(), "1001");

        assert!(mirror.accounts_of("nobody").await.is_empty());
    }

    #[test]
    fn duplicate_seed_rejected() {
        let mut duplicated = seeds();
        duplicated.push(duplicated[0].clone());
        assert!(MirrorStore::from_seeds(duplicated).is_err());
    }
}
