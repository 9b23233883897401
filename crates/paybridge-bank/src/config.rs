//! Service configuration.

use serde::Deserialize;
use std::path::Path;

use paybridge_core::{AccountNumber, Amount};

/// Bank service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct BankConfig {
    /// The bank's name as the PSP resolves it (default: "CIB").
    pub bank_name: String,

    /// Address to listen on (default: "0.0.0.0:8081").
    pub listen_addr: String,

    /// The shared static credential the PSP attaches to every request.
    pub api_key: String,

    /// Shared secret the account-number cipher is derived from. Must match
    /// the PSP's secret or every prepare will fail decryption.
    pub encryption_secret: String,

    /// Optional path to a JSON file of accounts to seed at startup.
    pub seed_accounts_path: Option<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl BankConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            bank_name: std::env::var("BANK_NAME").unwrap_or_else(|_| "CIB".into()),
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8081".into()),
            api_key: std::env::var("BANK_API_KEY").unwrap_or_else(|_| "dev-bank-key".into()),
            encryption_secret: std::env::var("ENCRYPTION_SECRET")
                .unwrap_or_else(|_| "dev-encryption-secret".into()),
            seed_accounts_path: std::env::var("SEED_ACCOUNTS_PATH").ok(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(64 * 1024),
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            bank_name: "CIB".into(),
            listen_addr: "0.0.0.0:8081".into(),
            api_key: "dev-bank-key".into(),
            encryption_secret: "dev-encryption-secret".into(),
            seed_accounts_path: None,
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 30,
        }
    }
}

/// One seeded account in the seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedAccount {
    /// The account number to create.
    pub account_number: AccountNumber,
    /// Opening balance in minor units.
    pub balance_cents: Amount,
}

/// Load seed accounts from a JSON file.
///
/// The file is a JSON array:
/// `[{"account_number": "1001", "balance_cents": 100000}, ...]`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_seed_accounts(path: &str) -> Result<Vec<SeedAccount>, std::io::Error> {
    let path = Path::new(path);
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
