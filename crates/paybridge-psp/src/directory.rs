//! Bank adapter resolution.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use paybridge_client::{BankClient, ClientOptions};
use paybridge_core::BankName;

use crate::adapter::{BankAdapter, HttpBankAdapter};
use crate::config::BankEndpoint;

/// Resolves a bank name to its adapter.
///
/// The directory is built once at startup from configuration; an unknown
/// bank name at transfer time is fatal for that transfer (nothing has been
/// sent, so nothing needs compensating).
#[derive(Clone, Default)]
pub struct BankDirectory {
    banks: HashMap<BankName, Arc<dyn BankAdapter>>,
}

impl BankDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory of HTTP adapters from configured endpoints.
    #[must_use]
    pub fn from_endpoints(endpoints: &[BankEndpoint], bank_timeout: Duration) -> Self {
        let mut directory = Self::new();
        for endpoint in endpoints {
            let client = BankClient::with_options(
                endpoint.base_url.clone(),
                endpoint.api_key.clone(),
                ClientOptions::with_timeout(bank_timeout),
            );
            tracing::info!(
                bank = %endpoint.name,
                base_url = %endpoint.base_url,
                "Registered bank adapter"
            );
            directory.insert(Arc::new(HttpBankAdapter::new(endpoint.name.clone(), client)));
        }
        directory
    }

    /// Register an adapter under its bank name.
    pub fn insert(&mut self, adapter: Arc<dyn BankAdapter>) {
        self.banks.insert(adapter.bank().clone(), adapter);
    }

    /// Resolve an adapter by bank name.
    #[must_use]
    pub fn resolve(&self, bank: &BankName) -> Option<Arc<dyn BankAdapter>> {
        self.banks.get(bank).cloned()
    }

    /// The names of all registered banks.
    #[must_use]
    pub fn bank_names(&self) -> Vec<BankName> {
        self.banks.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_configured_banks() {
        let endpoints = vec![
            BankEndpoint {
                name: BankName::new("CIB"),
                base_url: "http://cib:8081".into(),
                api_key: "cib-key".into(),
            },
            BankEndpoint {
                name: BankName::new("NBE"),
                base_url: "http://nbe:8082".into(),
                api_key: "nbe-key".into(),
            },
        ];

        let directory = BankDirectory::from_endpoints(&endpoints, Duration::from_secs(5));

        assert!(directory.resolve(&BankName::new("CIB")).is_some());
        assert!(directory.resolve(&BankName::new("NBE")).is_some());
        assert!(directory.resolve(&BankName::new("HSBC")).is_none());
    }
}
