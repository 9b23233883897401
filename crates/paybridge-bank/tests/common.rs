//! Common test utilities for bank service integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;

use paybridge_bank::{create_router, AppState, BankConfig};
use paybridge_core::{AccountCipher, AccountNumber, Amount};
use paybridge_ledger::{Account, Ledger};

/// The API key used by the test bank.
pub const API_KEY: &str = "test-bank-key";

/// The encryption secret shared by the test bank and the test "PSP".
pub const ENCRYPTION_SECRET: &str = "test-encryption-secret";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The bank's ledger, for asserting on balances directly.
    pub ledger: Arc<Ledger>,
    /// The cipher the "PSP side" of the tests encrypts account numbers with.
    pub cipher: AccountCipher,
}

impl TestHarness {
    /// Create a test bank with two seeded accounts:
    /// `1001` (1000.00) and `1002` (500.00).
    pub fn new() -> Self {
        let ledger = Arc::new(Ledger::new());
        ledger
            .insert_account(Account::new(
                AccountNumber::new("1001").unwrap(),
                Amount::from_cents(100_000).unwrap(),
            ))
            .unwrap();
        ledger
            .insert_account(Account::new(
                AccountNumber::new("1002").unwrap(),
                Amount::from_cents(50_000).unwrap(),
            ))
            .unwrap();

        let config = BankConfig {
            bank_name: "CIB".into(),
            listen_addr: "127.0.0.1:0".into(),
            api_key: API_KEY.into(),
            encryption_secret: ENCRYPTION_SECRET.into(),
            seed_accounts_path: None,
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 30,
        };

        let state = AppState::new(Arc::clone(&ledger), config);
        let router: Router = create_router(state);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            ledger,
            cipher: AccountCipher::new(ENCRYPTION_SECRET),
        }
    }

    /// Encrypt an account number the way the PSP would.
    pub fn encrypt(&self, account_number: &str) -> String {
        self.cipher.encrypt(account_number).unwrap()
    }

    /// Current balance of an account, read straight from the ledger.
    pub async fn balance(&self, account_number: &str) -> i64 {
        self.ledger
            .balance_of(&AccountNumber::new(account_number).unwrap())
            .await
            .unwrap()
            .cents()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
