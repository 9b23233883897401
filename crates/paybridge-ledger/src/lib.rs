//! Locked account and transaction storage for paybridge.
//!
//! Each bank process owns one [`Ledger`]; the PSP owns another for its
//! read-only account mirror. A ledger keeps every account and participant
//! transaction behind its own exclusive async lock, which is the in-process
//! rendition of a `SELECT ... FOR UPDATE` row lock under serializable
//! isolation: any operation that reads a balance with intent to mutate it
//! holds the row's lock for the duration of that one logical operation, and
//! two operations on the same account serialize.
//!
//! # Locking discipline
//!
//! Guards are owned (`OwnedMutexGuard`) so a handler can hold one across its
//! local awaits, but a guard must never be held across an outbound network
//! call. When two accounts must be locked together, [`Ledger::lock_account_pair`]
//! always acquires in ascending account-number order, so opposite-direction
//! operations on the same pair cannot deadlock.
//!
//! # Example
//!
//! ```
//! use paybridge_core::{AccountNumber, Amount};
//! use paybridge_ledger::{Account, Ledger};
//!
//! # async fn example() -> Result<(), paybridge_ledger::LedgerError> {
//! let ledger = Ledger::new();
//! let number = AccountNumber::new("1001").unwrap();
//! ledger.insert_account(Account::new(
//!     number.clone(),
//!     Amount::from_cents(100_000).unwrap(),
//! ))?;
//!
//! let mut account = ledger.lock_account(&number).await?;
//! account.withdraw(Amount::from_cents(2_500).unwrap())?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod records;
pub mod store;

pub use error::{LedgerError, Result};
pub use records::{Account, LegTransaction};
pub use store::{AccountGuard, Ledger, TransactionGuard};
