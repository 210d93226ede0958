//! Prompt fan-out to every rostered agent
//!
//! Two modes share one code path:
//! - `broadcast` waits for every agent and reports per-agent outcomes
//! - `spawn_broadcast` runs the same fan-out in a background task with a short
//!   timeout and only logs the outcomes
//!
//! A failing agent never affects the others; failures become
//! `DispatchOutcome::Failed` values.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adapters::agent_client::{AgentPrompt, AgentReply, AgentTransport};
use crate::domain::{ChainSelection, Roster};

const NO_RESPONSE: &str = "<no response>";

/// Result of sending one prompt to one agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// The agent answered with a 2xx status
    Delivered { response: String },
    /// Non-2xx answer, unreachable agent, or timeout
    Failed { error: String },
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered { .. })
    }
}

/// Outcomes of one broadcast, keyed by agent id
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastReport {
    pub broadcast_id: Uuid,
    pub chain: Option<ChainSelection>,
    pub outcomes: BTreeMap<String, DispatchOutcome>,
}

impl BroadcastReport {
    pub fn delivered(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_delivered()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    roster: Arc<Roster>,
    transport: Arc<dyn AgentTransport>,
    broadcast_timeout: Duration,
    sync_timeout: Option<Duration>,
}

impl Dispatcher {
    pub fn new(roster: Arc<Roster>, transport: Arc<dyn AgentTransport>) -> Self {
        Self {
            roster,
            transport,
            broadcast_timeout: Duration::from_millis(500),
            sync_timeout: None,
        }
    }

    /// Override the per-agent timeouts of both modes
    pub fn with_timeouts(mut self, broadcast_timeout: Duration, sync_timeout: Option<Duration>) -> Self {
        self.broadcast_timeout = broadcast_timeout;
        self.sync_timeout = sync_timeout;
        self
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Send a prompt to every agent and wait for all of them
    pub async fn broadcast(&self, prompt: &str, chain: Option<ChainSelection>) -> BroadcastReport {
        let broadcast_id = Uuid::new_v4();
        info!(%broadcast_id, agents = self.roster.len(), "Broadcasting prompt");
        self.fan_out(broadcast_id, prompt, chain, self.sync_timeout).await
    }

    /// Send a prompt to every agent without waiting.
    ///
    /// The returned handle resolves once every agent answered or timed out;
    /// dropping it leaves the task running.
    pub fn spawn_broadcast(
        &self,
        prompt: &str,
        chain: Option<ChainSelection>,
    ) -> (Uuid, JoinHandle<BroadcastReport>) {
        let broadcast_id = Uuid::new_v4();
        let dispatcher = self.clone();
        let prompt = prompt.to_string();
        let timeout = Some(self.broadcast_timeout);

        info!(%broadcast_id, agents = self.roster.len(), "Dispatching prompt in background");
        let handle = tokio::spawn(async move {
            let report = dispatcher.fan_out(broadcast_id, &prompt, chain, timeout).await;
            if report.failed() > 0 {
                warn!(
                    %broadcast_id,
                    delivered = report.delivered(),
                    failed = report.failed(),
                    "Background broadcast finished with failures"
                );
            }
            report
        });

        (broadcast_id, handle)
    }

    async fn fan_out(
        &self,
        broadcast_id: Uuid,
        prompt: &str,
        chain: Option<ChainSelection>,
        timeout: Option<Duration>,
    ) -> BroadcastReport {
        let payload = AgentPrompt {
            prompt: prompt.to_string(),
            chain_id: chain.as_ref().map(|c| c.id.clone()),
        };

        let sends = self.roster.iter().map(|agent| {
            let payload = &payload;
            async move {
                let outcome = match self
                    .transport
                    .post_prompt(&agent.endpoint, payload, timeout)
                    .await
                {
                    Ok(reply) => interpret_reply(reply),
                    Err(e) => DispatchOutcome::Failed {
                        error: format!("Could not reach agent: {}", e),
                    },
                };

                match &outcome {
                    DispatchOutcome::Delivered { .. } => {
                        debug!(%broadcast_id, agent_id = %agent.id, "Agent accepted prompt")
                    }
                    DispatchOutcome::Failed { error } => {
                        warn!(%broadcast_id, agent_id = %agent.id, %error, "Agent dispatch failed")
                    }
                }

                (agent.id.clone(), outcome)
            }
        });

        let outcomes = join_all(sends).await.into_iter().collect();

        BroadcastReport {
            broadcast_id,
            chain,
            outcomes,
        }
    }
}

/// Turn an HTTP answer into an outcome, pulling out the `response` field
fn interpret_reply(reply: AgentReply) -> DispatchOutcome {
    if !reply.is_success() {
        return DispatchOutcome::Failed {
            error: format!("Error {}: {}", reply.status, reply.body),
        };
    }

    let response = serde_json::from_str::<serde_json::Value>(&reply.body)
        .ok()
        .and_then(|body| match body.get("response")? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| NO_RESPONSE.to_string());

    DispatchOutcome::Delivered { response }
}
