use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::network::NetworkSimulator;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Authoritative records. Handlers take the write lock only after the
    /// network simulator has let the request through.
    pub store: Arc<RwLock<Store>>,
    pub network: NetworkSimulator,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Store, network: NetworkSimulator, config: Config) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            network,
            config,
        }
    }
}
