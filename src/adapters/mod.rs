pub mod agent_client;
pub mod api_server;

pub use agent_client::{AgentPrompt, AgentReply, AgentTransport, HttpAgentTransport, TransportError};
pub use api_server::start_api_server;
