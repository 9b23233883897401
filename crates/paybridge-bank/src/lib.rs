//! Bank participant service.
//!
//! One binary, one bank: the same service runs as any participant in the
//! transfer protocol, configured per bank (name, listen address, credential,
//! encryption secret, seed accounts). It exposes the participant protocol —
//! prepare, commit, rollback, balance — over HTTP+JSON and confines all side
//! effects to its own ledger; a participant never makes outbound calls.
//!
//! # Authentication
//!
//! Every protocol endpoint requires the bank's shared static API key in the
//! `x-api-key` header. Account numbers arrive AEAD-encrypted and are
//! decrypted at the boundary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Axum handlers all return Result; documenting each error variant per
// handler adds nothing over the ApiError type itself.
#![allow(clippy::missing_errors_doc)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod teller;

pub use config::BankConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
pub use teller::TellerService;
