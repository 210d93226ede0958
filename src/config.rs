use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::domain::{AgentIdentity, ChainCatalog, Roster};
use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Agents the master talks to
    #[serde(default = "default_agents")]
    pub agents: Vec<AgentIdentity>,
    /// Chain id -> display name
    #[serde(default = "default_chains")]
    pub chains: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    6000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Records kept per agent before the oldest is dropped
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Optional cap on parsed trades per agent (unbounded when unset)
    #[serde(default)]
    pub max_parsed_trades: Option<usize>,
}

fn default_history_capacity() -> usize {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            max_parsed_trades: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Per-agent timeout for fire-and-forget broadcasts in milliseconds
    #[serde(default = "default_broadcast_timeout")]
    pub broadcast_timeout_ms: u64,
    /// Per-agent timeout for send-and-wait broadcasts (no timeout when unset)
    #[serde(default)]
    pub sync_timeout_ms: Option<u64>,
}

fn default_broadcast_timeout() -> u64 {
    500
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            broadcast_timeout_ms: default_broadcast_timeout(),
            sync_timeout_ms: None,
        }
    }
}

impl DispatchConfig {
    pub fn broadcast_timeout(&self) -> Duration {
        Duration::from_millis(self.broadcast_timeout_ms)
    }

    pub fn sync_timeout(&self) -> Option<Duration> {
        self.sync_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_agents() -> Vec<AgentIdentity> {
    (0..3)
        .map(|i| {
            let port = 8000 + i;
            AgentIdentity::new(
                format!("agent_{}", port),
                format!("Agent {}", i + 1),
                format!("http://127.0.0.1:{}/chat", port),
            )
        })
        .collect()
}

fn default_chains() -> BTreeMap<String, String> {
    [
        ("1", "Ethereum Mainnet"),
        ("10", "Optimism Mainnet"),
        ("8453", "Base Mainnet"),
        ("42161", "Arbitrum Mainnet"),
        ("84532", "Base Sepolia"),
    ]
    .into_iter()
    .map(|(id, name)| (id.to_string(), name.to_string()))
    .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            dispatch: DispatchConfig::default(),
            logging: LoggingConfig::default(),
            agents: default_agents(),
            chains: default_chains(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> std::result::Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("MAESTRO_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (MAESTRO_SERVER__PORT, etc.)
            .add_source(
                Environment::with_prefix("MAESTRO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Build the validated roster
    pub fn roster(&self) -> Result<Roster> {
        Roster::new(self.agents.clone())
    }

    pub fn chain_catalog(&self) -> ChainCatalog {
        ChainCatalog::new(self.chains.clone())
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.server.host.trim().is_empty() {
            errors.push("server.host must not be blank".to_string());
        }

        if self.agents.is_empty() {
            errors.push("at least one agent must be configured".to_string());
        }

        let mut seen = std::collections::HashSet::new();
        for agent in &self.agents {
            if agent.id.trim().is_empty() {
                errors.push(format!("agent with endpoint {} has a blank id", agent.endpoint));
            } else if !seen.insert(agent.id.as_str()) {
                errors.push(format!("duplicate agent id: {}", agent.id));
            }

            match url::Url::parse(&agent.endpoint) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => errors.push(format!(
                    "agent {} endpoint must be http(s), got scheme {}",
                    agent.id,
                    url.scheme()
                )),
                Err(e) => errors.push(format!(
                    "agent {} endpoint {} is not a valid URL: {}",
                    agent.id, agent.endpoint, e
                )),
            }
        }

        if self.store.history_capacity == 0 {
            errors.push("store.history_capacity must be positive".to_string());
        }

        if self.store.max_parsed_trades == Some(0) {
            errors.push("store.max_parsed_trades must be positive when set".to_string());
        }

        if self.dispatch.broadcast_timeout_ms == 0 {
            errors.push("dispatch.broadcast_timeout_ms must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
