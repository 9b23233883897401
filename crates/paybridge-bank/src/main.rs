//! Bank participant service - one configurable bank process.
//!
//! This is the main entry point for a participant bank.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paybridge_bank::{create_router, AppState, BankConfig};
use paybridge_bank::config::load_seed_accounts;
use paybridge_ledger::{Account, Ledger};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,paybridge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BankConfig::from_env();

    tracing::info!(
        bank = %config.bank_name,
        listen_addr = %config.listen_addr,
        seed_accounts = ?config.seed_accounts_path,
        "Starting bank participant service"
    );

    let ledger = Arc::new(Ledger::new());

    if let Some(path) = &config.seed_accounts_path {
        let seeds = load_seed_accounts(path)?;
        for seed in seeds {
            tracing::info!(
                account = %seed.account_number,
                balance = %seed.balance_cents,
                "Seeding account"
            );
            ledger.insert_account(Account::new(seed.account_number, seed.balance_cents))?;
        }
    } else {
        tracing::warn!("No seed accounts configured - ledger starts empty");
    }

    let state = AppState::new(ledger, config.clone());
    let app = create_router(state);

    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
