//! Dependency-injection context threaded through every operation
//! (spec §2 "Lifecycle Controller").

use spm_config::Config;
use spm_events::EventSender;
use spm_index::IndexStore;
use spm_net::NetClient;
use spm_store::Store;
use std::time::Duration;

/// Everything an operation needs to reach the engine's components,
/// built once per CLI invocation.
pub struct OpsCtx {
    pub config: Config,
    pub index_store: IndexStore,
    pub net: NetClient,
    pub store: Store,
    pub events: Option<EventSender>,
}

impl OpsCtx {
    /// Build a context from a loaded [`Config`].
    ///
    /// # Errors
    ///
    /// Returns an error if the network client cannot be constructed.
    pub fn new(config: Config, events: Option<EventSender>) -> Result<Self, spm_errors::Error> {
        let net = NetClient::new(Duration::from_secs(config.network.timeout_secs))?;
        let index_store = IndexStore::new(config.index_cache_path(), config.network.index_url.clone());
        let store = Store::new(config.store_path());
        Ok(Self {
            config,
            index_store,
            net,
            store,
            events,
        })
    }
}
