//! PSP transfer coordinator service.
//!
//! This is the main entry point for the PSP.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paybridge_core::AccountCipher;
use paybridge_psp::config::load_mirror_seeds;
use paybridge_psp::{
    create_router, AppState, BankDirectory, MirrorStore, PspConfig, TransferCoordinator,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,paybridge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PspConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        banks = config.banks.len(),
        mirror_seed = ?config.mirror_seed_path,
        "Starting PSP transfer coordinator"
    );

    let seeds = match &config.mirror_seed_path {
        Some(path) => load_mirror_seeds(path)?,
        None => {
            tracing::warn!("No mirror seed configured - no accounts are tracked");
            Vec::new()
        }
    };
    let mirror = MirrorStore::from_seeds(seeds)?;

    let banks = BankDirectory::from_endpoints(
        &config.banks,
        Duration::from_secs(config.bank_timeout_seconds),
    );
    if banks.bank_names().is_empty() {
        tracing::warn!("No bank endpoints configured - transfers will fail to resolve adapters");
    }

    let cipher = AccountCipher::new(&config.encryption_secret);
    let coordinator = Arc::new(TransferCoordinator::new(
        mirror,
        banks,
        cipher,
        Duration::from_secs(config.phase_deadline_seconds),
    ));

    let state = AppState::new(coordinator, config.clone());
    let app = create_router(state);

    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
