//! Application state shared across handlers.

use drydock_core::config::ProxyAppConfig;
use drydock_storage::ObjectStore;
use std::sync::Arc;

/// Shared application state.
///
/// Immutable after startup; handlers only read it, so requests proceed
/// in parallel with no locking discipline.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<ProxyAppConfig>,
    /// Object storage backend holding the published artifacts.
    pub storage: Arc<dyn ObjectStore>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(config: ProxyAppConfig, storage: Arc<dyn ObjectStore>) -> Self {
        Self {
            config: Arc::new(config),
            storage,
        }
    }
}
