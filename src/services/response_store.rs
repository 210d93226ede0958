//! In-memory store of agent replies
//!
//! Each roster agent owns a bounded history of raw replies and a list of the
//! trades parsed out of them. The roster is fixed at construction, so the map
//! of agents never changes and only the per-agent ledgers need locking.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::{ParsedTrade, ResponseRecord, Roster};
use crate::error::{MaestroError, Result};
use crate::parser::parse_trade_response;

/// Per-agent state guarded by its own lock
#[derive(Debug, Default)]
struct AgentLedger {
    history: VecDeque<ResponseRecord>,
    trades: VecDeque<ParsedTrade>,
}

/// Point-in-time copy of everything the store holds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub raw_responses: BTreeMap<String, Vec<ResponseRecord>>,
    pub parsed_responses: BTreeMap<String, Vec<ParsedTrade>>,
}

pub struct ResponseStore {
    roster: Arc<Roster>,
    history_capacity: usize,
    max_parsed_trades: Option<usize>,
    ledgers: HashMap<String, RwLock<AgentLedger>>,
}

impl ResponseStore {
    /// Create a store for `roster` keeping the `history_capacity` most recent
    /// records per agent. Parsed trades are kept without limit.
    pub fn new(roster: Arc<Roster>, history_capacity: usize) -> Self {
        let ledgers = roster
            .iter()
            .map(|agent| (agent.id.clone(), RwLock::new(AgentLedger::default())))
            .collect();

        Self {
            roster,
            history_capacity: history_capacity.max(1),
            max_parsed_trades: None,
            ledgers,
        }
    }

    /// Bound the parsed-trade list too, dropping the oldest trade first
    pub fn with_max_parsed_trades(mut self, limit: Option<usize>) -> Self {
        self.max_parsed_trades = limit.map(|l| l.max(1));
        self
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Record a reply from an agent and parse it for a trade.
    ///
    /// Returns the parsed trade when one was found. Fails with
    /// `UnknownAgent` without touching any state if the id is not rostered.
    pub async fn record_response(
        &self,
        agent_id: &str,
        prompt: &str,
        message: &str,
    ) -> Result<Option<ParsedTrade>> {
        let ledger = self
            .ledgers
            .get(agent_id)
            .ok_or_else(|| MaestroError::UnknownAgent(agent_id.to_string()))?;

        let parsed = parse_trade_response(message);
        let record = ResponseRecord::agent_reply(agent_id, prompt, message);

        {
            let mut ledger = ledger.write().await;
            push_bounded(&mut ledger.history, record, Some(self.history_capacity));
            if let Some(ref trade) = parsed {
                push_bounded(&mut ledger.trades, trade.clone(), self.max_parsed_trades);
            }
        }

        match parsed {
            Some(ref trade) => info!(
                agent_id,
                amount_eth = trade.amount_eth,
                link = %trade.link,
                "Parsed trade from agent reply"
            ),
            None => debug!(agent_id, "No trade found in agent reply"),
        }

        Ok(parsed)
    }

    /// Note a dispatched broadcast in every agent's history
    pub async fn record_broadcast(&self, prompt: &str, note: &str) {
        for agent in self.roster.iter() {
            if let Some(ledger) = self.ledgers.get(&agent.id) {
                let record = ResponseRecord::broadcast_notice(&agent.id, prompt, note);
                let mut ledger = ledger.write().await;
                push_bounded(&mut ledger.history, record, Some(self.history_capacity));
            }
        }
    }

    /// Copy of one agent's history, oldest first
    pub async fn history(&self, agent_id: &str) -> Result<Vec<ResponseRecord>> {
        let ledger = self
            .ledgers
            .get(agent_id)
            .ok_or_else(|| MaestroError::UnknownAgent(agent_id.to_string()))?;
        let ledger = ledger.read().await;
        Ok(ledger.history.iter().cloned().collect())
    }

    /// Copy of every agent's history and parsed trades
    pub async fn snapshot(&self) -> StoreSnapshot {
        let mut raw_responses = BTreeMap::new();
        let mut parsed_responses = BTreeMap::new();

        for agent in self.roster.iter() {
            let Some(ledger) = self.ledgers.get(&agent.id) else {
                continue;
            };
            let ledger = ledger.read().await;
            raw_responses.insert(agent.id.clone(), ledger.history.iter().cloned().collect());
            parsed_responses.insert(agent.id.clone(), ledger.trades.iter().cloned().collect());
        }

        StoreSnapshot {
            raw_responses,
            parsed_responses,
        }
    }
}

fn push_bounded<T>(buffer: &mut VecDeque<T>, item: T, limit: Option<usize>) {
    buffer.push_back(item);
    if let Some(limit) = limit {
        while buffer.len() > limit {
            buffer.pop_front();
        }
    }
}
