//! Client error types.

/// Errors that can occur when talking to a participant bank.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed (connection refused, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The bank does not know the account or transaction id.
    #[error("not found: {message}")]
    NotFound {
        /// The bank's message.
        message: String,
    },

    /// The addressed transaction is not in an eligible state.
    #[error("invalid state: {message}")]
    InvalidState {
        /// The bank's message.
        message: String,
    },

    /// A withdrawal would drive the balance negative.
    #[error("insufficient funds: balance={balance}, required={required}")]
    InsufficientFunds {
        /// Current balance in minor units.
        balance: i64,
        /// Required amount in minor units.
        required: i64,
    },

    /// The bank rejected the shared credential.
    #[error("unauthorized")]
    Unauthorized,

    /// Any other error response from the bank.
    #[error("API error: {code} - {message}")]
    Api {
        /// The envelope's machine-readable code.
        code: String,
        /// The envelope's message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether this error means the bank was never reached (or never
    /// answered), as opposed to the bank answering with a rejection.
    ///
    /// Transport-level failures are what the coordinator treats as
    /// remote-unavailable; everything else is a definite answer.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}
