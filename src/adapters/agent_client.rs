//! HTTP client for agent chat endpoints
//!
//! Agents expose `POST /chat` taking `{"prompt": ..., "chain_id": ...}` and
//! answering `{"response": ...}`. The dispatcher only sees the trait so tests
//! can swap the network out.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::error::Result;

/// Body posted to an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPrompt {
    pub prompt: String,
    /// Chain the agent should act on for this prompt only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
}

/// Raw HTTP answer from an agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    pub status: u16,
    pub body: String,
}

impl AgentReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The agent could not be reached or did not answer in time
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgentTransport: Send + Sync {
    /// Post a prompt to one agent endpoint.
    ///
    /// Any HTTP status counts as a reply; only connection-level failures and
    /// timeouts are errors.
    async fn post_prompt(
        &self,
        endpoint: &str,
        payload: &AgentPrompt,
        timeout: Option<Duration>,
    ) -> std::result::Result<AgentReply, TransportError>;
}

/// reqwest-backed transport shared by all dispatches
#[derive(Clone)]
pub struct HttpAgentTransport {
    http: Client,
}

impl HttpAgentTransport {
    pub fn new() -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self { http })
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl AgentTransport for HttpAgentTransport {
    async fn post_prompt(
        &self,
        endpoint: &str,
        payload: &AgentPrompt,
        timeout: Option<Duration>,
    ) -> std::result::Result<AgentReply, TransportError> {
        let mut request = self.http.post(endpoint).json(payload);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        debug!(endpoint, status, "Agent answered");
        Ok(AgentReply { status, body })
    }
}
