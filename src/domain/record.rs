use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Where a history entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Reply reported by the agent through the callback endpoint
    Agent,
    /// Notice written by the master when it dispatched a broadcast
    Broadcast,
}

/// One prompt/reply pair in an agent's history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseRecord {
    pub agent_id: String,
    pub prompt: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub kind: RecordKind,
}

impl ResponseRecord {
    pub fn agent_reply(agent_id: &str, prompt: &str, message: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            prompt: prompt.to_string(),
            message: message.to_string(),
            timestamp: Utc::now(),
            kind: RecordKind::Agent,
        }
    }

    pub fn broadcast_notice(agent_id: &str, prompt: &str, note: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            prompt: format!("[BROADCAST] {}", prompt),
            message: note.to_string(),
            timestamp: Utc::now(),
            kind: RecordKind::Broadcast,
        }
    }
}

/// An ETH amount paired with the transaction link it was reported with.
///
/// Serializes as a single-entry object, `{"0.25": "https://..."}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTrade {
    pub amount_eth: f64,
    pub link: String,
}

impl ParsedTrade {
    /// Map key used on the wire; always carries a decimal point ("2.0", "0.25")
    pub fn amount_key(&self) -> String {
        format!("{:?}", self.amount_eth)
    }
}

impl Serialize for ParsedTrade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.amount_key(), &self.link)?;
        map.end()
    }
}
