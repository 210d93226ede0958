use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{MaestroError, Result};

/// A configured chat agent reachable over HTTP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIdentity {
    /// Stable identifier agents report back with (e.g. "agent_8000")
    pub id: String,
    /// Display label for the dashboard
    #[serde(default)]
    pub name: String,
    /// Chat endpoint the master posts prompts to
    pub endpoint: String,
}

impl AgentIdentity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Name to show in UIs, falling back to the id
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// The static list of known agents, in configuration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    agents: Vec<AgentIdentity>,
}

impl Roster {
    /// Build a roster, rejecting blank or duplicate ids
    pub fn new(agents: Vec<AgentIdentity>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for agent in &agents {
            let id = agent.id.trim();
            if id.is_empty() {
                return Err(MaestroError::InvalidRoster("agent id must not be blank".into()));
            }
            if !seen.insert(id.to_string()) {
                return Err(MaestroError::InvalidRoster(format!("duplicate agent id: {}", id)));
            }
        }
        Ok(Self { agents })
    }

    pub fn get(&self, agent_id: &str) -> Option<&AgentIdentity> {
        self.agents.iter().find(|a| a.id == agent_id)
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.get(agent_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentIdentity> {
        self.agents.iter()
    }

    pub fn ids(&self) -> Vec<String> {
        self.agents.iter().map(|a| a.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// A chain picked for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainSelection {
    pub id: String,
    pub name: String,
}

/// Supported chain ids mapped to display names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainCatalog {
    chains: BTreeMap<String, String>,
}

impl ChainCatalog {
    pub fn new(chains: BTreeMap<String, String>) -> Self {
        Self { chains }
    }

    /// Resolve an optional selector from a request.
    ///
    /// Blank selectors count as "no chain". Unknown ids are rejected so a typo
    /// never reaches the agents.
    pub fn resolve(&self, selector: Option<&str>) -> Result<Option<ChainSelection>> {
        let Some(id) = selector.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        match self.chains.get(id) {
            Some(name) => Ok(Some(ChainSelection {
                id: id.to_string(),
                name: name.clone(),
            })),
            None => Err(MaestroError::UnknownChain(id.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.chains.iter()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}
