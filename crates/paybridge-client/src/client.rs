//! Bank HTTP client implementation.

use reqwest::Client;
use std::time::Duration;

use paybridge_core::{
    Amount, ApiErrorEnvelope, BalanceRequest, BalanceResponse, ErrorCode, LegId, LegResponse,
    ListAccountsResponse, PrepareRequest,
};

use crate::error::ClientError;

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// HTTP client for one participant bank.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct BankClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl BankClient {
    /// Create a client with the default timeout.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the bank service (e.g. `"http://cib-bank:8081"`)
    /// * `api_key` - The bank's shared static credential
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_options(base_url, api_key, ClientOptions::default())
    }

    /// Create a client with custom options.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with
    /// default settings).
    #[must_use]
    pub fn with_options(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        options: ClientOptions,
    ) -> Self {
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Prepare one leg at the bank.
    ///
    /// A `2xx` response carries the bank-minted leg id and its status; the
    /// coordinator must check the status, since a bank that recovered a
    /// local failure reports it here rather than as an HTTP error.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the bank returns an error
    /// envelope (unknown account, bad credential, ...).
    pub async fn prepare(&self, request: &PrepareRequest) -> Result<LegResponse, ClientError> {
        let url = format!("{}/v1/transactions/prepare", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Commit a prepared leg.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the bank returns an error
    /// envelope (unknown id, ineligible state, ...).
    pub async fn commit(&self, transaction_id: LegId) -> Result<LegResponse, ClientError> {
        let url = format!(
            "{}/v1/transactions/{}/commit",
            self.base_url, transaction_id
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Roll back a leg (idempotent at the bank).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the bank returns an error
    /// envelope.
    pub async fn rollback(&self, transaction_id: LegId) -> Result<LegResponse, ClientError> {
        let url = format!(
            "{}/v1/transactions/{}/rollback",
            self.base_url, transaction_id
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Locked read of the bank's authoritative balance for one account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the bank returns an error
    /// envelope.
    pub async fn get_balance(&self, encrypted_account_number: &str) -> Result<Amount, ClientError> {
        let url = format!("{}/v1/accounts/balance", self.base_url);
        let request = BalanceRequest {
            account_number: encrypted_account_number.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let body: BalanceResponse = self.handle_response(response).await?;
        Ok(body.balance_cents)
    }

    /// List the bank's accounts (operator/test surface).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the bank returns an error
    /// envelope.
    pub async fn list_accounts(&self) -> Result<ListAccountsResponse, ClientError> {
        let url = format!("{}/v1/accounts", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle an API response and convert the error envelope to typed errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        tracing::debug!(base_url = %self.base_url, status = %status, "Bank returned an error response");
        let error_body: Result<ApiErrorEnvelope, _> = response.json().await;

        match error_body {
            Ok(envelope) => {
                let message = envelope.error.message;
                match envelope.error.code {
                    ErrorCode::NotFound => Err(ClientError::NotFound { message }),
                    ErrorCode::InvalidState => Err(ClientError::InvalidState { message }),
                    ErrorCode::Unauthorized => Err(ClientError::Unauthorized),
                    ErrorCode::InsufficientFunds => {
                        let balance = envelope
                            .error
                            .details
                            .as_ref()
                            .and_then(|d| d.get("balance"))
                            .and_then(serde_json::Value::as_i64)
                            .unwrap_or(0);
                        let required = envelope
                            .error
                            .details
                            .as_ref()
                            .and_then(|d| d.get("required"))
                            .and_then(serde_json::Value::as_i64)
                            .unwrap_or(0);

                        Err(ClientError::InsufficientFunds { balance, required })
                    }
                    code => Err(ClientError::Api {
                        code: serde_json::to_string(&code)
                            .unwrap_or_else(|_| "unknown".into())
                            .trim_matches('"')
                            .to_string(),
                        message,
                        status: status.as_u16(),
                    }),
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-request timeout; a timed-out call is indistinguishable from an
    /// unreachable bank and drives the coordinator's rollback path.
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

impl ClientOptions {
    /// Create options with a custom timeout.
    #[must_use]
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}
