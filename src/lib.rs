pub mod adapters;
pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod parser;
pub mod services;

pub use adapters::{AgentTransport, HttpAgentTransport};
pub use api::{create_router, AppState};
pub use config::AppConfig;
pub use domain::{AgentIdentity, ChainCatalog, ChainSelection, ParsedTrade, ResponseRecord, Roster};
pub use error::{MaestroError, Result};
pub use parser::parse_trade_response;
pub use services::{BroadcastReport, DispatchOutcome, Dispatcher, ResponseStore, StoreSnapshot};
