//! Service configuration.

use serde::Deserialize;
use std::path::Path;

use paybridge_core::BankName;

use crate::mirror::MirrorSeed;

/// PSP service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct PspConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Shared secret the account-number cipher is derived from; must match
    /// the participating banks.
    pub encryption_secret: String,

    /// The participant banks this PSP can reach.
    pub banks: Vec<BankEndpoint>,

    /// Optional path to a JSON file of mirrored accounts to seed at startup.
    pub mirror_seed_path: Option<String>,

    /// Per-request timeout towards a bank, in seconds.
    pub bank_timeout_seconds: u64,

    /// Overall deadline for one protocol phase (both participant calls), in
    /// seconds. Expiry drives the same rollback path as a failed response.
    pub phase_deadline_seconds: u64,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds for the PSP's own HTTP surface.
    pub request_timeout_seconds: u64,
}

/// One participant bank endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BankEndpoint {
    /// The bank name transfers resolve adapters by.
    pub name: BankName,
    /// Base URL of the bank's participant service.
    pub base_url: String,
    /// The bank's shared static credential.
    pub api_key: String,
}

impl PspConfig {
    /// Load configuration from environment variables and the banks file.
    #[must_use]
    pub fn from_env() -> Self {
        let banks = std::env::var("BANKS_CONFIG_PATH")
            .ok()
            .and_then(|path| match load_json_file::<Vec<BankEndpoint>>(&path) {
                Ok(banks) => {
                    tracing::info!(path = %path, count = banks.len(), "Loaded bank endpoints");
                    Some(banks)
                }
                Err(e) => {
                    tracing::error!(path = %path, error = %e, "Failed to load bank endpoints");
                    None
                }
            })
            .unwrap_or_default();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            encryption_secret: std::env::var("ENCRYPTION_SECRET")
                .unwrap_or_else(|_| "dev-encryption-secret".into()),
            banks,
            mirror_seed_path: std::env::var("MIRROR_SEED_PATH").ok(),
            bank_timeout_seconds: std::env::var("BANK_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            phase_deadline_seconds: std::env::var("PHASE_DEADLINE_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(15),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(64 * 1024),
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
        }
    }
}

impl Default for PspConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            encryption_secret: "dev-encryption-secret".into(),
            banks: Vec::new(),
            mirror_seed_path: None,
            bank_timeout_seconds: 10,
            phase_deadline_seconds: 15,
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 60,
        }
    }
}

/// Load mirrored accounts from a JSON file.
///
/// The file is a JSON array:
/// `[{"account_number": "1001", "bank": "CIB", "owner": "farid",
///    "balance_cents": 100000}, ...]`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_mirror_seeds(path: &str) -> Result<Vec<MirrorSeed>, std::io::Error> {
    load_json_file(path)
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
