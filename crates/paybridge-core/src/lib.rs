//! Core types and utilities for paybridge.
//!
//! This crate provides the foundational types shared by the PSP and the bank
//! services:
//!
//! - **Identifiers**: `AccountNumber`, `BankName`, `LegId`, `TransferId`
//! - **Money**: `Amount` (integer minor units)
//! - **State machines**: `LegStatus` (bank-local), `TransferStatus` (PSP)
//! - **Wire protocol**: request/response bodies exchanged between the PSP
//!   and the participant banks
//! - **Crypto**: the opaque account-number cipher used at trust boundaries
//!
//! # Minor units
//!
//! All monetary values are carried as `i64` minor units (cents). A balance of
//! `1050` is 10.50 in the ledger currency. Floating point never touches a
//! balance.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod crypto;
pub mod ids;
pub mod money;
pub mod protocol;
pub mod status;

pub use crypto::{AccountCipher, CryptoError};
pub use ids::{AccountNumber, BankName, IdError, LegId, TransferId};
pub use money::{Amount, MoneyError};
pub use protocol::{
    AccountSummary, ApiErrorBody, ApiErrorEnvelope, BalanceRequest, BalanceResponse, ErrorCode,
    LegResponse, ListAccountsResponse, PrepareRequest, TransferRequest, TransferResponse,
};
pub use status::{Direction, LegStatus, TransferStatus};
