//! PSP transfer coordinator service.
//!
//! The PSP moves money between accounts held at independent banks without
//! ever touching a bank's ledger directly: it drives a two-phase
//! prepare/commit protocol against each bank's participant service and
//! compensates with rollbacks when any phase fails partway.
//!
//! The pieces:
//!
//! - [`coordinator::TransferCoordinator`] - owns the transfer state machine
//!   and the compensation logic
//! - [`adapter::BankAdapter`] - the uniform per-bank capability
//!   {prepare, commit, rollback, get balance}
//! - [`directory::BankDirectory`] - resolves a bank name to its adapter
//! - [`mirror::MirrorStore`] - the PSP's read-only mirror of the accounts it
//!   tracks; a cache, never authoritative
//! - [`transfers::TransferStore`] - coordinator transfer records and history

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Axum handlers all return Result; documenting each error variant per
// handler adds nothing over the ApiError type itself.
#![allow(clippy::missing_errors_doc)]

pub mod adapter;
pub mod auth;
pub mod config;
pub mod coordinator;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod mirror;
pub mod routes;
pub mod state;
pub mod transfers;

pub use adapter::{AdapterError, BankAdapter, HttpBankAdapter};
pub use config::{BankEndpoint, PspConfig};
pub use coordinator::TransferCoordinator;
pub use directory::BankDirectory;
pub use error::{ApiError, TransferError};
pub use mirror::{MirrorSeed, MirrorStore};
pub use routes::create_router;
pub use state::AppState;
