//! Bank client adapter SDK.
//!
//! This crate gives the PSP a uniform capability per participant bank —
//! {prepare, commit, rollback, get balance} — and hides the transport: base
//! URL, the `x-api-key` credential attached to every request, JSON bodies,
//! timeouts, and the mapping of the error envelope to typed errors.
//!
//! # Example
//!
//! ```no_run
//! use paybridge_client::BankClient;
//! use paybridge_core::{Amount, Direction, PrepareRequest};
//!
//! # async fn example() -> Result<(), paybridge_client::ClientError> {
//! let client = BankClient::new("http://cib-bank:8081", "cib-api-key");
//!
//! let leg = client
//!     .prepare(&PrepareRequest {
//!         account_number: "b64-ciphertext".into(),
//!         direction: Direction::Withdrawal,
//!         amount_cents: Amount::from_cents(30_000).unwrap(),
//!         idempotency_key: "01J...".into(),
//!     })
//!     .await?;
//!
//! println!("leg {} is {}", leg.transaction_id, leg.status);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;

pub use client::{BankClient, ClientOptions};
pub use error::ClientError;
