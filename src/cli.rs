use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::error::{MaestroError, Result};
use crate::parser::parse_trade_response;
use crate::services::{BroadcastReport, DispatchOutcome, Dispatcher};

#[derive(Parser)]
#[command(name = "maestro")]
#[command(author = "Maestro Team")]
#[command(version = "0.1.0")]
#[command(about = "Master server that fans prompts out to chat agents", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config directory
    #[arg(short, long, default_value = "config", env = "MAESTRO_CONFIG_DIR")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the master server (default)
    Serve {
        /// Override the configured listen port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Send a prompt to every configured agent and print the outcomes
    Broadcast {
        /// Prompt text
        prompt: String,
        /// Chain id the agents should use (e.g. 8453)
        #[arg(long)]
        chain: Option<String>,
        /// Fire-and-forget mode with the short broadcast timeout
        #[arg(long)]
        detach: bool,
    },
    /// Run the trade parser on a piece of text
    Parse {
        /// Agent reply to parse
        text: String,
    },
    /// Show configured agents and chains
    Roster,
}

/// Print the roster and chain table
pub fn show_roster(config: &AppConfig) {
    println!("Agents:");
    for agent in &config.agents {
        println!("  {:<14} {:<10} {}", agent.id, agent.display_name(), agent.endpoint);
    }
    println!("Chains:");
    for (id, name) in &config.chains {
        println!("  {:<8} {}", id, name);
    }
}

/// Print the parsed trade as JSON, or a note when nothing was found
pub fn show_parse(text: &str) -> Result<()> {
    match parse_trade_response(text) {
        Some(trade) => println!("{}", serde_json::to_string_pretty(&trade)?),
        None => println!("\x1b[33mNo trade found\x1b[0m"),
    }
    Ok(())
}

/// Broadcast from the command line
pub async fn run_broadcast(
    dispatcher: &Dispatcher,
    config: &AppConfig,
    prompt: &str,
    chain: Option<&str>,
    detach: bool,
) -> Result<()> {
    if prompt.trim().is_empty() {
        return Err(MaestroError::missing("prompt"));
    }
    let chain = config.chain_catalog().resolve(chain)?;

    let report = if detach {
        let (_, handle) = dispatcher.spawn_broadcast(prompt, chain);
        handle
            .await
            .map_err(|e| MaestroError::Internal(format!("broadcast task failed: {}", e)))?
    } else {
        dispatcher.broadcast(prompt, chain).await
    };

    print_report(&report);
    Ok(())
}

fn print_report(report: &BroadcastReport) {
    println!("Broadcast {}", report.broadcast_id);
    if let Some(chain) = &report.chain {
        println!("Chain: {} ({})", chain.name, chain.id);
    }
    for (agent_id, outcome) in &report.outcomes {
        match outcome {
            DispatchOutcome::Delivered { response } => {
                println!("\x1b[32m✓ {}\x1b[0m {}", agent_id, response)
            }
            DispatchOutcome::Failed { error } => {
                println!("\x1b[31m✗ {}\x1b[0m {}", agent_id, error)
            }
        }
    }
    println!(
        "{} delivered, {} failed",
        report.delivered(),
        report.failed()
    );
}
