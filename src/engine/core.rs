// 6.0 engine/core.rs: the marketplace. holds the injected store handle, the
// retry policy, and the audit log. purely request-scoped: no background
// tasks, no cross-call caches, every operation re-reads fresh state.

use crate::config::MarketplaceConfig;
use crate::events::{AuditLog, Event};
use crate::store::MarketStore;

#[derive(Debug)]
pub struct Marketplace<S: MarketStore> {
    pub(super) store: S,
    pub(super) config: MarketplaceConfig,
    pub(super) audit: AuditLog,
}

impl<S: MarketStore> Marketplace<S> {
    pub fn new(store: S, config: MarketplaceConfig) -> Self {
        Self {
            store,
            config,
            audit: AuditLog::new(),
        }
    }

    pub fn with_default_config(store: S) -> Self {
        Self::new(store, MarketplaceConfig::default())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &MarketplaceConfig {
        &self.config
    }

    pub fn events(&self) -> Vec<Event> {
        self.audit.events()
    }
}
