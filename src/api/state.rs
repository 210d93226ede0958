use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::adapters::agent_client::{AgentTransport, HttpAgentTransport};
use crate::config::AppConfig;
use crate::domain::{ChainCatalog, Roster};
use crate::error::Result;
use crate::services::{Dispatcher, ResponseStore};

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Agent replies and parsed trades
    pub store: Arc<ResponseStore>,

    /// Prompt fan-out to the roster
    pub dispatcher: Arc<Dispatcher>,

    /// Chains a request may select
    pub chains: Arc<ChainCatalog>,

    /// Application start time
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: Arc<ResponseStore>, dispatcher: Arc<Dispatcher>, chains: ChainCatalog) -> Self {
        Self {
            store,
            dispatcher,
            chains: Arc::new(chains),
            start_time: Utc::now(),
        }
    }

    /// Wire the store and dispatcher from configuration over a given transport
    pub fn with_transport(config: &AppConfig, transport: Arc<dyn AgentTransport>) -> Result<Self> {
        let roster = Arc::new(config.roster()?);

        let store = ResponseStore::new(Arc::clone(&roster), config.store.history_capacity)
            .with_max_parsed_trades(config.store.max_parsed_trades);
        let dispatcher = Dispatcher::new(roster, transport).with_timeouts(
            config.dispatch.broadcast_timeout(),
            config.dispatch.sync_timeout(),
        );

        Ok(Self::new(
            Arc::new(store),
            Arc::new(dispatcher),
            config.chain_catalog(),
        ))
    }

    /// Production wiring with the reqwest transport
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::with_transport(config, Arc::new(HttpAgentTransport::new()?))
    }

    pub fn roster(&self) -> &Roster {
        self.store.roster()
    }

    /// Get system uptime in seconds
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }
}
