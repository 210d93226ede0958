use clap::Parser;
use maestro::adapters::{start_api_server, HttpAgentTransport};
use maestro::api::AppState;
use maestro::cli::{self, Cli, Commands};
use maestro::config::AppConfig;
use maestro::error::{MaestroError, Result};
use maestro::services::Dispatcher;
use std::sync::Arc;
use tracing::{error, info};

mod main_runtime;

use main_runtime::{init_logging, init_logging_simple};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        None => {
            let config = load_config(&cli.config)?;
            init_logging(&config.logging);
            run_server(config, None).await?;
        }
        Some(Commands::Serve { port }) => {
            let config = load_config(&cli.config)?;
            init_logging(&config.logging);
            run_server(config, *port).await?;
        }
        Some(Commands::Broadcast {
            prompt,
            chain,
            detach,
        }) => {
            init_logging_simple();
            let config = load_config(&cli.config)?;
            let roster = Arc::new(config.roster()?);
            let dispatcher = Dispatcher::new(roster, Arc::new(HttpAgentTransport::new()?))
                .with_timeouts(
                    config.dispatch.broadcast_timeout(),
                    config.dispatch.sync_timeout(),
                );
            cli::run_broadcast(&dispatcher, &config, prompt, chain.as_deref(), *detach).await?;
        }
        Some(Commands::Parse { text }) => {
            init_logging_simple();
            cli::show_parse(text)?;
        }
        Some(Commands::Roster) => {
            init_logging_simple();
            let config = load_config(&cli.config)?;
            cli::show_roster(&config);
        }
    }

    Ok(())
}

fn load_config(config_dir: &str) -> Result<AppConfig> {
    let config = AppConfig::load_from(config_dir)?;
    if let Err(errors) = config.validate() {
        for e in &errors {
            eprintln!("\x1b[31m✗ {}\x1b[0m", e);
        }
        return Err(MaestroError::InvalidConfig(errors.join("; ")));
    }
    Ok(config)
}

async fn run_server(config: AppConfig, port_override: Option<u16>) -> Result<()> {
    let port = port_override.unwrap_or(config.server.port);
    let state = AppState::from_config(&config)?;

    info!(
        agents = config.agents.len(),
        history_capacity = config.store.history_capacity,
        broadcast_timeout_ms = config.dispatch.broadcast_timeout_ms,
        "Starting master server"
    );
    for agent in &config.agents {
        info!(agent_id = %agent.id, endpoint = %agent.endpoint, "Registered agent");
    }

    if let Err(e) = start_api_server(state, &config.server.host, port).await {
        error!("Master server failed: {}", e);
        return Err(e);
    }
    Ok(())
}
