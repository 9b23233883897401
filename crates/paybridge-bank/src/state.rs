//! Application state.

use std::sync::Arc;

use paybridge_core::AccountCipher;
use paybridge_ledger::Ledger;

use crate::config::BankConfig;
use crate::teller::TellerService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// This bank's ledger.
    pub ledger: Arc<Ledger>,

    /// Service configuration.
    pub config: BankConfig,

    /// The participant state machine over the ledger.
    pub teller: TellerService,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(ledger: Arc<Ledger>, config: BankConfig) -> Self {
        let cipher = AccountCipher::new(&config.encryption_secret);
        let teller = TellerService::new(
            config.bank_name.clone(),
            Arc::clone(&ledger),
            cipher,
        );

        Self {
            ledger,
            config,
            teller,
        }
    }
}
