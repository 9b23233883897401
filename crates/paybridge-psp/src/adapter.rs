//! The uniform per-bank capability the coordinator drives.
//!
//! `BankAdapter` is the seam between the coordinator's state machine and the
//! transport: the production implementation wraps the HTTP client SDK, and
//! tests substitute scripted adapters. The coordinator never sees URLs,
//! credentials, or HTTP status codes - only leg responses and
//! [`AdapterError`]s.

use async_trait::async_trait;

use paybridge_client::{BankClient, ClientError};
use paybridge_core::{Amount, BankName, ErrorCode, LegId, LegResponse, PrepareRequest};

/// Errors an adapter can surface to the coordinator.
///
/// The critical distinction is [`AdapterError::Unreachable`]: the bank was
/// never reached or never answered, so the outcome of the call is unknown.
/// Every other variant is a definite answer from the bank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    /// The bank could not be reached or did not answer in time.
    #[error("bank unreachable: {0}")]
    Unreachable(String),

    /// The bank does not know the account or transaction.
    #[error("not found: {0}")]
    NotFound(String),

    /// The bank refused the operation for the leg's current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The bank reported insufficient funds.
    #[error("insufficient funds: balance={balance}, required={required}")]
    InsufficientFunds {
        /// Balance reported by the bank, in minor units.
        balance: i64,
        /// Required amount in minor units.
        required: i64,
    },

    /// The bank rejected the shared credential.
    #[error("unauthorized")]
    Unauthorized,

    /// Any other definite failure.
    #[error("{0}")]
    Other(String),
}

impl AdapterError {
    /// The taxonomy code this error propagates as.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Unreachable(_) => ErrorCode::RemoteUnavailable,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::InvalidState(_) => ErrorCode::InvalidState,
            Self::InsufficientFunds { .. } => ErrorCode::InsufficientFunds,
            Self::Unauthorized => ErrorCode::Unauthorized,
            Self::Other(_) => ErrorCode::Internal,
        }
    }
}

impl From<ClientError> for AdapterError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) => Self::Unreachable(e.to_string()),
            ClientError::NotFound { message } => Self::NotFound(message),
            ClientError::InvalidState { message } => Self::InvalidState(message),
            ClientError::InsufficientFunds { balance, required } => {
                Self::InsufficientFunds { balance, required }
            }
            ClientError::Unauthorized => Self::Unauthorized,
            ClientError::Api { code, message, .. } => Self::Other(format!("{code}: {message}")),
            ClientError::Serialization(e) => Self::Other(e.to_string()),
        }
    }
}

/// The uniform capability the coordinator holds per participant bank.
#[async_trait]
pub trait BankAdapter: Send + Sync {
    /// The bank this adapter reaches.
    fn bank(&self) -> &BankName;

    /// Prepare one leg.
    async fn prepare(&self, request: &PrepareRequest) -> Result<LegResponse, AdapterError>;

    /// Commit a prepared leg.
    async fn commit(&self, transaction_id: LegId) -> Result<LegResponse, AdapterError>;

    /// Roll back a leg.
    async fn rollback(&self, transaction_id: LegId) -> Result<LegResponse, AdapterError>;

    /// Read the bank's authoritative balance for an (encrypted) account.
    async fn get_balance(&self, encrypted_account_number: &str) -> Result<Amount, AdapterError>;
}

/// Production adapter: the HTTP client SDK behind the [`BankAdapter`] seam.
pub struct HttpBankAdapter {
    bank: BankName,
    client: BankClient,
}

impl HttpBankAdapter {
    /// Wrap a configured client for one bank.
    #[must_use]
    pub fn new(bank: BankName, client: BankClient) -> Self {
        Self { bank, client }
    }
}

#[async_trait]
impl BankAdapter for HttpBankAdapter {
    fn bank(&self) -> &BankName {
        &self.bank
    }

    async fn prepare(&self, request: &PrepareRequest) -> Result<LegResponse, AdapterError> {
        Ok(self.client.prepare(request).await?)
    }

    async fn commit(&self, transaction_id: LegId) -> Result<LegResponse, AdapterError> {
        Ok(self.client.commit(transaction_id).await?)
    }

    async fn rollback(&self, transaction_id: LegId) -> Result<LegResponse, AdapterError> {
        Ok(self.client.rollback(transaction_id).await?)
    }

    async fn get_balance(&self, encrypted_account_number: &str) -> Result<Amount, AdapterError> {
        Ok(self.client.get_balance(encrypted_account_number).await?)
    }
}
