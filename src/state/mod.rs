pub mod history;
pub mod hub;
pub mod registry;
pub mod store;

use crate::config::Config;
use history::MessageHistory;
use hub::BroadcastHub;
use registry::SessionRegistry;
use store::SharedStateStore;

/// Everything the hub shares across connections.
pub struct AppState {
    pub registry: SessionRegistry,
    pub store: SharedStateStore,
    pub history: MessageHistory,
    pub hub: BroadcastHub,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            registry: SessionRegistry::new(),
            store: SharedStateStore::new(),
            history: MessageHistory::new(config.history_limit),
            hub: BroadcastHub::new(),
        }
    }
}
