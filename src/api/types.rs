use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::error;
use uuid::Uuid;

use crate::domain::{ChainCatalog, ChainSelection};
use crate::error::{MaestroError, Result};
use crate::services::{BroadcastReport, DispatchOutcome};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Map a crate error onto an HTTP status and JSON body
pub fn api_error(err: MaestroError) -> ApiError {
    let status = match &err {
        MaestroError::UnknownAgent(_) => StatusCode::NOT_FOUND,
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        _ => {
            error!(error = %err, "Request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

fn required(value: Option<String>, field: &'static str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| MaestroError::missing(field))
}

// ============================================================================
// Callback Types
// ============================================================================

/// Body agents post when they finish a prompt
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackRequest {
    pub agent_id: Option<String>,
    pub response: Option<String>,
    pub prompt: Option<String>,
}

/// A callback that passed presence checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCallback {
    pub agent_id: String,
    pub response: String,
    pub prompt: String,
}

impl CallbackRequest {
    pub fn validate(self) -> Result<AgentCallback> {
        Ok(AgentCallback {
            agent_id: required(self.agent_id, "agent_id")?,
            response: required(self.response, "response")?,
            prompt: self.prompt.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackAck {
    pub status: String,
}

// ============================================================================
// Prompt Types
// ============================================================================

/// Prompt submission from the API or the dashboard form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptRequest {
    pub prompt: Option<String>,
    #[serde(default, alias = "chain_id")]
    pub chain: Option<String>,
}

/// A prompt ready to fan out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptCommand {
    pub prompt: String,
    pub chain: Option<ChainSelection>,
}

impl PromptRequest {
    pub fn validate(self, chains: &ChainCatalog) -> Result<PromptCommand> {
        let prompt = required(self.prompt, "prompt")?;
        let chain = chains.resolve(self.chain.as_deref())?;
        Ok(PromptCommand { prompt, chain })
    }
}

/// Reply of the send-and-wait endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SendPromptResponse {
    pub broadcast_id: Uuid,
    pub chain: Option<ChainSelection>,
    pub immediate_responses: BTreeMap<String, DispatchOutcome>,
    pub note: String,
}

impl From<BroadcastReport> for SendPromptResponse {
    fn from(report: BroadcastReport) -> Self {
        Self {
            broadcast_id: report.broadcast_id,
            chain: report.chain,
            immediate_responses: report.outcomes,
            note: "Agents will callback to /agent_callback with final responses.".to_string(),
        }
    }
}

/// Reply of the fire-and-forget endpoint
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastAck {
    pub status: String,
    pub broadcast_id: Uuid,
    pub agents: Vec<String>,
    pub note: String,
}

// ============================================================================
// Health Check Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub agents: usize,
    pub uptime_secs: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_requires_agent_id_and_response() {
        let err = CallbackRequest {
            agent_id: Some("agent_8000".into()),
            response: Some(String::new()),
            prompt: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "No response provided");

        let err = CallbackRequest {
            agent_id: None,
            response: Some("done".into()),
            prompt: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "No agent_id provided");

        // Whitespace is still a reply
        let spaced = CallbackRequest {
            agent_id: Some("agent_8000".into()),
            response: Some("\n  ".into()),
            prompt: None,
        }
        .validate()
        .unwrap();
        assert_eq!(spaced.response, "\n  ");

        let ok = CallbackRequest {
            agent_id: Some("agent_8000".into()),
            response: Some("done".into()),
            prompt: None,
        }
        .validate()
        .unwrap();
        assert_eq!(ok.prompt, "");
    }

    #[test]
    fn prompt_keeps_whitespace_only_text() {
        let chains = ChainCatalog::new(BTreeMap::new());
        let command = PromptRequest {
            prompt: Some("  ".into()),
            chain: None,
        }
        .validate(&chains)
        .unwrap();
        assert_eq!(command.prompt, "  ");

        let err = PromptRequest::default().validate(&chains).unwrap_err();
        assert_eq!(err.to_string(), "No prompt provided");
    }

    #[test]
    fn error_statuses() {
        assert_eq!(api_error(MaestroError::missing("prompt")).0, StatusCode::BAD_REQUEST);
        assert_eq!(
            api_error(MaestroError::UnknownAgent("x".into())).0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            api_error(MaestroError::Internal("x".into())).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
