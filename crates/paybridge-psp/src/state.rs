//! Application state.

use std::sync::Arc;

use crate::config::PspConfig;
use crate::coordinator::TransferCoordinator;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The transfer coordinator.
    pub coordinator: Arc<TransferCoordinator>,

    /// Service configuration.
    pub config: PspConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(coordinator: Arc<TransferCoordinator>, config: PspConfig) -> Self {
        Self {
            coordinator,
            config,
        }
    }
}
