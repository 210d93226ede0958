use thiserror::Error;

/// Main error type for the master server
#[derive(Error, Debug)]
pub enum MaestroError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Request validation errors
    #[error("No {field} provided")]
    MissingField { field: &'static str },

    #[error("Invalid request body: {0}")]
    InvalidPayload(String),

    #[error("Unknown agent ID: {0}")]
    UnknownAgent(String),

    #[error("Unknown chain: {0}")]
    UnknownChain(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MaestroError {
    pub fn missing(field: &'static str) -> Self {
        MaestroError::MissingField { field }
    }

    /// True for errors caused by the caller's input rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MaestroError::MissingField { .. }
                | MaestroError::InvalidPayload(_)
                | MaestroError::UnknownAgent(_)
                | MaestroError::UnknownChain(_)
        )
    }
}

/// Result type alias for MaestroError
pub type Result<T> = std::result::Result<T, MaestroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_agent_message_names_the_id() {
        let err = MaestroError::UnknownAgent("agent_9999".to_string());
        assert_eq!(err.to_string(), "Unknown agent ID: agent_9999");
        assert!(err.is_client_error());
    }

    #[test]
    fn missing_field_message() {
        assert_eq!(MaestroError::missing("prompt").to_string(), "No prompt provided");
        assert!(!MaestroError::Internal("boom".into()).is_client_error());
    }
}
